/*!
 * Change notification for core state.
 *
 * The registry and the interval store each own a [`ChangeHub`] and fire it
 * after every mutation. Dependents (the presentation layer, tests)
 * subscribe at construction time; there is no ambient global bus.
 */

/// Callback invoked after a mutation of the owning component.
pub type ChangeObserver = Box<dyn FnMut()>;

/// A plain observer list.
///
/// Mutations in this tool are synchronous and single-threaded, so the hub
/// is nothing more than a vector of callbacks run to completion before the
/// mutating operation returns.
#[derive(Default)]
pub struct ChangeHub {
    observers: Vec<ChangeObserver>,
}

impl ChangeHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Observers stay subscribed for the lifetime
    /// of the owning component.
    pub fn subscribe(&mut self, observer: ChangeObserver) {
        self.observers.push(observer);
    }

    /// Invoke every observer, in subscription order.
    pub fn notify(&mut self) {
        for observer in &mut self.observers {
            observer();
        }
    }

    /// Number of subscribed observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for ChangeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeHub")
            .field("observers", &self.observers.len())
            .finish()
    }
}
