// tests/config_tests.rs
mod common;

use common::*;
use park::{Park, ParkConfig, ParkError, MAX_LANES, MAX_LISTENERS, MAX_STAGES};

#[test]
fn test_capacity_errors_leave_existing_configuration_untouched() {
  setup_tracing();
  let park = Park::with_config(ParkConfig::builder().lanes(2).stage_def(double()).build().unwrap());

  let too_many_lanes = ParkConfig::<i64>::builder().lanes(MAX_LANES + 1).build();
  assert!(matches!(
    too_many_lanes,
    Err(ParkError::CapacityExceeded { field: "lanes", .. })
  ));

  let mut builder = ParkConfig::<i64>::builder();
  for _ in 0..=MAX_STAGES {
    builder = builder.stage_def(add_one());
  }
  assert!(matches!(
    builder.build(),
    Err(ParkError::CapacityExceeded { field: "stages", .. })
  ));

  assert_eq!(park.config().lanes(), 2);
  assert_eq!(park.config().stage_names(), vec!["double"]);
}

#[test]
fn test_listener_ceiling_applies_to_registration() {
  setup_tracing();
  let park = Park::<i64>::new();
  for _ in 0..MAX_LISTENERS {
    park.add_listener(|_ev| {}).unwrap();
  }
  let err = park.add_listener(|_ev| {}).unwrap_err();
  match err {
    ParkError::CapacityExceeded { field, limit, requested } => {
      assert_eq!(field, "listeners");
      assert_eq!(limit, MAX_LISTENERS);
      assert_eq!(requested, MAX_LISTENERS + 1);
    }
    other => panic!("Expected CapacityExceeded, got {other:?}"),
  }
  assert_eq!(park.config().listener_count(), MAX_LISTENERS);

  park.clear_listeners().unwrap();
  assert_eq!(park.config().listener_count(), 0);
}

#[test]
fn test_configure_replaces_configuration_while_initial() {
  setup_tracing();
  let park = Park::<i64>::new();
  assert_eq!(park.config().lanes(), 1);

  let config = ParkConfig::builder()
    .lanes(4)
    .queue_capacity(3)
    .stage_def(double())
    .stage_def(fail_if_over(10))
    .build()
    .unwrap();
  park.configure(config).unwrap();

  let current = park.config();
  assert_eq!(current.lanes(), 4);
  assert_eq!(current.queue_capacity(), 3);
  assert_eq!(current.stage_names(), vec!["double", "fail_if_over"]);
}

#[test]
fn test_error_messages_name_the_offending_field() {
  let err = ParkConfig::<i64>::builder().lanes(0).build().unwrap_err();
  assert!(err.to_string().contains("lanes"));
  assert!(!err.is_item_error());

  let err = ParkConfig::<i64>::builder().lanes(MAX_LANES * 2).build().unwrap_err();
  assert_eq!(
    err.to_string(),
    format!("Capacity exceeded for 'lanes': requested {}, limit is {}", MAX_LANES * 2, MAX_LANES)
  );
}
