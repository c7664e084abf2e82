#![no_main]
use chew_core::analysis::{FoodAnalysis, MAX_CHEWS, MIN_CHEWS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Whatever the service sends, a parsed analysis stays in range.
    if let Ok(a) = FoodAnalysis::from_reply(data) {
        assert!((MIN_CHEWS..=MAX_CHEWS).contains(&a.recommended_chews));
        assert!(!a.food_name.trim().is_empty());
    }
});
