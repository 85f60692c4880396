#![cfg_attr(not(feature = "std"), no_std, no_main)]

#[ink::contract]
mod counter {
    /// A counter that any account can move up or down.
    #[ink(storage)]
    pub struct Counter {
        value: i64,
    }

    #[ink(event)]
    pub struct Changed {
        #[ink(topic)]
        by: AccountId,
        value: i64,
    }

    impl Counter {
        #[ink(constructor)]
        pub fn new(init_value: i64) -> Self {
            Self { value: init_value }
        }

        #[ink(constructor)]
        pub fn default() -> Self {
            Self::new(0)
        }

        #[ink(message)]
        pub fn increment(&mut self) {
            self.value = self.value.saturating_add(1);
            self.emit_changed();
        }

        #[ink(message)]
        pub fn decrement(&mut self) {
            self.value = self.value.saturating_sub(1);
            self.emit_changed();
        }

        #[ink(message)]
        pub fn get(&self) -> i64 {
            self.value
        }

        fn emit_changed(&self) {
            self.env().emit_event(Changed {
                by: self.env().caller(),
                value: self.value,
            });
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[ink::test]
        fn starts_at_init_value() {
            assert_eq!(Counter::new(7).get(), 7);
            assert_eq!(Counter::default().get(), 0);
        }

        #[ink::test]
        fn moves_both_ways() {
            let mut counter = Counter::default();
            counter.increment();
            counter.increment();
            counter.decrement();
            assert_eq!(counter.get(), 1);
        }
    }
}
