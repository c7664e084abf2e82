use chew_core::analysis::{MAX_CHEWS, MIN_CHEWS};
use chew_core::mocks::{FailingEstimator, ScriptedEstimator};
use chew_core::{Degradation, FoodAnalysis, FoodAnalysisClient, TextureLevel};
use rstest::rstest;

const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xD9];

#[test]
fn network_failure_returns_fallback_verbatim() {
    let client = FoodAnalysisClient::new(FailingEstimator::new("connection timed out"));
    let out = client.analyze_jpeg(JPEG);

    assert_eq!(out.analysis.food_name, "AI 连接中断");
    assert_eq!(out.analysis.calories, 0);
    assert_eq!(out.analysis.texture_level, TextureLevel::Medium);
    assert_eq!(out.analysis.recommended_chews, 30);
    assert_eq!(out.analysis, FoodAnalysis::fallback());
    assert!(matches!(out.degradation, Some(Degradation::Transport { .. })));
}

#[test]
fn rate_limit_is_recognised() {
    let client = FoodAnalysisClient::new(FailingEstimator::new("status 429: quota exhausted"));
    let out = client.analyze_jpeg(JPEG);
    assert_eq!(out.degradation, Some(Degradation::RateLimited));
    assert_eq!(out.analysis, FoodAnalysis::fallback());
}

#[rstest]
#[case("not json at all")]
#[case("[1, 2, 3]")]
#[case("42")]
fn unreadable_reply_falls_back(#[case] reply: &str) {
    let client = FoodAnalysisClient::new(ScriptedEstimator::new(reply));
    let out = client.analyze_base64("AAAA");
    assert_eq!(out.analysis, FoodAnalysis::fallback());
    assert!(matches!(out.degradation, Some(Degradation::Malformed { .. })));
}

#[test]
fn one_odd_field_keeps_the_rest_of_the_reply() {
    let out = FoodAnalysisClient::new(ScriptedEstimator::new(
        r#"{"foodName":"牛排","calories":"lots","textureLevel":"Hard","recommendedChews":35,"fatShieldTip":"嚼 35 次"}"#,
    ))
    .analyze_base64("AAAA");
    assert!(out.degradation.is_none());
    assert_eq!(out.analysis.food_name, "牛排");
    assert_eq!(out.analysis.calories, 300);
    assert_eq!(out.analysis.texture_level, TextureLevel::Hard);
    assert_eq!(out.analysis.recommended_chews, 35);
}

#[rstest]
#[case(r#"{"foodName":"牛排","calories":"620","textureLevel":"Hard","recommendedChews":35,"fatShieldTip":"t"}"#, "牛排", 620, 35)]
#[case(r#"{"foodName":7,"calories":620,"textureLevel":"Hard","recommendedChews":"35","fatShieldTip":"t"}"#, "未知餐食", 620, 35)]
fn mistyped_fields_default_individually(
    #[case] reply: &str,
    #[case] name: &str,
    #[case] calories: u32,
    #[case] chews: u32,
) {
    let out = FoodAnalysisClient::new(ScriptedEstimator::new(reply)).analyze_base64("AAAA");
    assert!(out.degradation.is_none());
    assert_eq!(out.analysis.food_name, name);
    assert_eq!(out.analysis.calories, calories);
    assert_eq!(out.analysis.recommended_chews, chews);
}

#[test]
fn well_formed_reply_passes_through() {
    let est = ScriptedEstimator::new(
        r#"{"foodName":"沙拉","calories":210,"textureLevel":"Soft","recommendedChews":20,"fatShieldTip":"多嚼几下"}"#,
    );
    let client = FoodAnalysisClient::new(est.clone());
    let out = client.analyze_jpeg(JPEG);
    assert!(!out.is_degraded());
    assert_eq!(
        out.analysis,
        FoodAnalysis {
            food_name: "沙拉".into(),
            calories: 210,
            texture_level: TextureLevel::Soft,
            recommended_chews: 20,
            fat_shield_tip: "多嚼几下".into(),
        }
    );
    assert_eq!(est.calls(), 1);
}

#[rstest]
#[case(3, MIN_CHEWS)]
#[case(80, MAX_CHEWS)]
#[case(33, 33)]
fn chew_count_is_clamped(#[case] raw: i64, #[case] expected: u32) {
    let reply = format!(r#"{{"foodName":"x","calories":100,"textureLevel":"Hard","recommendedChews":{raw},"fatShieldTip":"t"}}"#);
    let out = FoodAnalysisClient::new(ScriptedEstimator::new(reply)).analyze_base64("AAAA");
    assert_eq!(out.analysis.recommended_chews, expected);
    assert!(out.degradation.is_none());
}

#[test]
fn missing_fields_get_defaults() {
    let out = FoodAnalysisClient::new(ScriptedEstimator::new("```json\n{}\n```")).analyze_base64("AAAA");
    assert!(out.degradation.is_none());
    assert_eq!(out.analysis.food_name, "未知餐食");
    assert_eq!(out.analysis.calories, 300);
    assert_eq!(out.analysis.texture_level, TextureLevel::Medium);
    assert_eq!(out.analysis.recommended_chews, 25);
    assert!(!out.analysis.fat_shield_tip.is_empty());
}
