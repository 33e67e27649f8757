//! Test registry: the ordered list of test cases handed to the dispatcher.
//!
//! Registration happens on a single thread through `&mut TestRegistry` and
//! strictly precedes dispatch, which only ever borrows the registry shared.
//! Once borrowed for dispatch the registry is read concurrently by every
//! worker without further synchronization.

use std::fmt;

/// Smallest capacity the registry allocates once it holds anything.
pub const MIN_CAPACITY: usize = 16;

/// Body of a test case: takes nothing, returns nothing.
pub type TestFn = Box<dyn Fn() + Send + Sync + 'static>;

/// A single registered unit of work.
pub struct TestCase {
    name: String,
    body: TestFn,
}

impl TestCase {
    /// Create a named test case.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    /// Name used in logs and reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invoke the test body on the current thread.
    pub fn invoke(&self) {
        (self.body)()
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish()
    }
}

/// Ordered, append-only collection of test cases.
#[derive(Debug, Default)]
pub struct TestRegistry {
    tests: Vec<TestCase>,
}

impl TestRegistry {
    /// Create an empty registry. Nothing is allocated until the first test.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an unnamed test case; it is reported as `test_<index>`.
    pub fn register<F>(&mut self, body: F) -> usize
    where
        F: Fn() + Send + Sync + 'static,
    {
        let name = format!("test_{}", self.tests.len());
        self.push(TestCase::new(name, body))
    }

    /// Append a named test case, returning its index.
    pub fn register_named<F>(&mut self, name: impl Into<String>, body: F) -> usize
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.push(TestCase::new(name, body))
    }

    /// Append an already-built test case, returning its index.
    pub fn push(&mut self, test: TestCase) -> usize {
        if self.tests.len() == self.tests.capacity() {
            // Grow to max(16, 2 * capacity) so registration stays linear overall.
            let target = MIN_CAPACITY.max(self.tests.capacity() * 2);
            self.tests.reserve_exact(target - self.tests.len());
        }
        self.tests.push(test);
        self.tests.len() - 1
    }

    /// Number of registered test cases.
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Slots currently allocated for test cases.
    pub fn capacity(&self) -> usize {
        self.tests.capacity()
    }

    /// The test case at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&TestCase> {
        self.tests.get(index)
    }

    /// Test cases in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.tests.iter()
    }
}
