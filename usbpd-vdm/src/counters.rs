//! Definition of counters, used to bound repeated protocol attempts.

/// Counter errors.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The counter wrapped past its maximum value.
    Overrun,
}

/// A saturating attempt counter with a spec-defined maximum.
#[derive(Debug, Clone, Copy)]
pub struct Counter {
    value: u8,
    max_value: u8,
}

/// Types of counters.
#[derive(Debug, Clone, Copy)]
pub enum CounterType {
    /// Discover-Identity attempts towards the cable plug.
    DiscoverIdentity,
}

impl Counter {
    /// Create a new counter of the given type.
    pub fn new(counter_type: CounterType) -> Self {
        // See spec, [Table 6.70]
        let max_value = match counter_type {
            CounterType::DiscoverIdentity => 20,
        };

        Self { value: 0, max_value }
    }

    /// The current counter value.
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Increment the counter, reporting an overrun when it wraps.
    pub fn increment(&mut self) -> Result<(), Error> {
        self.value = (self.value + 1) % (self.max_value + 1);

        if self.value == 0 { Err(Error::Overrun) } else { Ok(()) }
    }

    /// Reset the counter to zero.
    pub fn reset(&mut self) {
        self.value = 0;
    }
}
