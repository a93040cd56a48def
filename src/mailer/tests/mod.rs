//! Unit tests for mailer registry, facade, and module orchestration.

mod module_tests;
