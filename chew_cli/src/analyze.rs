//! `analyze` and `self-check`.

use std::path::Path;

use chew_config::Config;
use chew_core::FoodAnalysisClient;
use chew_core::gemini::GeminiEstimator;
use eyre::WrapErr;
use serde_json::json;

pub fn run_analyze(cfg: &Config, image: &Path, json: bool) -> eyre::Result<()> {
    let jpeg = std::fs::read(image).wrap_err_with(|| format!("read image {}", image.display()))?;
    let estimator = GeminiEstimator::from_config(&cfg.estimator)?;
    tracing::info!(image = %image.display(), bytes = jpeg.len(), url = estimator.url(), "analyze");

    let outcome = FoodAnalysisClient::new(estimator).analyze_jpeg(&jpeg);
    if let Some(reason) = &outcome.degradation {
        eprintln!("note: {}", reason.user_message());
    }

    if json {
        println!("{}", serde_json::to_string(&outcome)?);
    } else {
        let a = &outcome.analysis;
        println!("Food:          {}", a.food_name);
        println!("Calories:      {} kcal", a.calories);
        println!("Texture:       {}", a.texture_level);
        println!("Chews / bite:  {}", a.recommended_chews);
        println!("Tip:           {}", a.fat_shield_tip);
    }
    Ok(())
}

pub fn run_self_check(cfg: &Config, config_path: &Path, json: bool) -> eyre::Result<()> {
    let estimator = GeminiEstimator::from_config(&cfg.estimator)?;
    let has_key = estimator.has_api_key();
    if !has_key {
        tracing::warn!(env = %cfg.estimator.api_key_env, "estimation credential not set");
    }

    if json {
        let report = json!({
            "config": config_path.display().to_string(),
            "endpoint": estimator.url(),
            "apiKeyEnv": cfg.estimator.api_key_env,
            "apiKeyPresent": has_key,
            "timeoutMs": cfg.estimator.timeout_ms,
            "preferRearCamera": cfg.camera.prefer_rear,
        });
        println!("{report}");
    } else {
        println!("config ok ({})", config_path.display());
        println!("estimator: {}", estimator.url());
        if has_key {
            println!("credential: {} is set", cfg.estimator.api_key_env);
        } else {
            println!(
                "credential: {} is NOT set; analyses will use the fallback",
                cfg.estimator.api_key_env
            );
        }
    }
    Ok(())
}
