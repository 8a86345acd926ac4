pub mod schedule_testkit;
