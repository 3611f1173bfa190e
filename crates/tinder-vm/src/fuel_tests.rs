use super::*;

#[test]
fn default_limits_are_generous_but_finite() {
    let limits = FuelLimits::default();
    assert!(limits.instruction_fuel > 0);
    assert!(limits.return_stack_limit > 0);
}

#[test]
fn builder_methods_override_individual_fields() {
    let limits = FuelLimits::default().instruction_fuel(10).return_stack_limit(2);
    assert_eq!(limits.instruction_fuel, 10);
    assert_eq!(limits.return_stack_limit, 2);
}
