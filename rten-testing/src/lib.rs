//! Testing utilities for the rten-matmul-infer crate.

use std::any::Any;
use std::fmt::Debug;
use std::panic::{RefUnwindSafe, UnwindSafe};

/// Utility for creating parametrized (aka. table-driven) tests.
///
/// To create a table driven test:
///
/// 1. Import the `TestCases` trait
/// 2. Create a struct, conventionally named `Case`, that contains the data
///    for a single test case. This struct must implement `Debug`.
/// 3. Create a collection of `Case` instances (eg. an array or Vec),
///    conventionally named `cases`.
/// 4. Call `cases.test_each`, passing the test function as a closure
///
/// `test_each` runs every case, catching panics, and then panics with a
/// report listing the index, debug representation and panic message of each
/// failing case.
///
/// ## Example
///
/// ```
/// use rten_testing::TestCases;
///
/// #[derive(Debug)]
/// struct Case {
///   ndim: usize,
///   batch_dims: usize,
/// }
///
/// let cases = [
///   Case { ndim: 2, batch_dims: 0 },
///   Case { ndim: 4, batch_dims: 2 },
/// ];
///
/// cases.test_each(|&Case { ndim, batch_dims }| {
///   assert_eq!(ndim.saturating_sub(2), batch_dims);
/// });
/// ```
///
/// ## Unwind safety
///
/// Test cases and the test function are required to be
/// [unwind safe](https://doc.rust-lang.org/std/panic/fn.catch_unwind.html).
/// If a case is not, use [`test_each_clone`](TestCases::test_each_clone)
/// with owned cases or wrap fields in
/// [`AssertUnwindSafe`](std::panic::AssertUnwindSafe).
pub trait TestCases {
    /// The data for a single test case.
    type Case;

    /// Call test function `test` with a reference to each test case,
    /// catching any panics.
    fn test_each(self, test: impl Fn(&Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe;

    /// Variant of [`test_each`](TestCases::test_each) which passes a clone
    /// of each test case to the test function.
    fn test_each_clone(self, test: impl Fn(Self::Case) + RefUnwindSafe)
    where
        Self::Case: Debug + Clone + UnwindSafe;
}

/// A test case which panicked.
struct Failure {
    index: usize,
    case: String,
    message: String,
}

/// Extract the message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "<non-string panic payload>".to_string()
    }
}

/// Panic with a report if any cases failed.
fn report_failures(failures: &[Failure]) {
    if failures.is_empty() {
        return;
    }
    let mut report = format!("{} test cases failed:", failures.len());
    for failure in failures {
        report.push_str(&format!(
            "\n  case {}: {}\n    {}",
            failure.index, failure.case, failure.message
        ));
    }
    panic!("{}", report);
}

impl<I: IntoIterator> TestCases for I {
    type Case = I::Item;

    fn test_each(self, test: impl Fn(&I::Item) + RefUnwindSafe)
    where
        Self::Case: Debug + RefUnwindSafe,
    {
        let mut failures = Vec::new();
        for (index, case) in self.into_iter().enumerate() {
            if let Err(payload) = std::panic::catch_unwind(|| test(&case)) {
                failures.push(Failure {
                    index,
                    case: format!("{:?}", case),
                    message: panic_message(payload.as_ref()),
                });
            }
        }
        report_failures(&failures);
    }

    fn test_each_clone(self, test: impl Fn(I::Item) + RefUnwindSafe)
    where
        Self::Case: Clone + Debug + UnwindSafe,
    {
        let mut failures = Vec::new();
        for (index, case) in self.into_iter().enumerate() {
            let value = case.clone();
            let test = &test;
            if let Err(payload) = std::panic::catch_unwind(move || test(value)) {
                failures.push(Failure {
                    index,
                    case: format!("{:?}", case),
                    message: panic_message(payload.as_ref()),
                });
            }
        }
        report_failures(&failures);
    }
}
