//! Boundary to the external food-analysis oracle.
//!
//! The oracle receives a free-text description or a photo of a meal and
//! replies with JSON estimates. This module owns the request type, the trait
//! an oracle client implements, and the parsing of its replies into
//! [`FoodItem`]s. Foods produced here are indistinguishable from manually
//! entered ones.

use crate::{Error, FoodItem, MealRecord, MealType, Result};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// What to ask the oracle about
#[derive(Clone, Debug)]
pub enum AnalysisRequest {
    Text(String),
    Image { mime_type: String, bytes: Vec<u8> },
}

/// A client for the food-analysis oracle
pub trait FoodAnalyzer {
    fn analyze(&self, request: &AnalysisRequest) -> Result<FoodAnalysis>;
}

/// Food item as the oracle reports it; numbers may be fractional or missing
#[derive(Debug, Deserialize)]
struct RawFood {
    name: String,
    #[serde(default)]
    calories: Option<f64>,
    #[serde(default, alias = "proteinGrams", alias = "protein")]
    protein_grams: Option<f64>,
    #[serde(default, alias = "carbsGrams", alias = "carbs")]
    carbs_grams: Option<f64>,
    #[serde(default, alias = "fatGrams", alias = "fat")]
    fat_grams: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawAnalysis {
    foods: Vec<RawFood>,
    #[serde(default, alias = "mealType")]
    meal_type: Option<String>,
}

fn clamp_amount(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.round().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

impl RawFood {
    fn into_food(self) -> FoodItem {
        FoodItem {
            name: self.name.trim().to_string(),
            calories: clamp_amount(self.calories),
            protein_grams: clamp_amount(self.protein_grams),
            carbs_grams: clamp_amount(self.carbs_grams),
            fat_grams: clamp_amount(self.fat_grams),
        }
    }
}

/// Structured estimate returned by the oracle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FoodAnalysis {
    pub foods: Vec<FoodItem>,
    pub meal_type: Option<MealType>,
}

impl FoodAnalysis {
    /// Parse an oracle reply
    ///
    /// The JSON object may be wrapped in prose or a markdown code fence.
    /// Unnamed foods are dropped; a reply without any usable food is an error.
    pub fn from_response(response: &str) -> Result<Self> {
        let json = extract_json(response)?;
        let raw: RawAnalysis = serde_json::from_str(&json)?;

        let foods: Vec<FoodItem> = raw
            .foods
            .into_iter()
            .map(RawFood::into_food)
            .filter(|f| !f.name.is_empty())
            .collect();

        if foods.is_empty() {
            return Err(Error::Analysis("reply contains no foods".into()));
        }

        let meal_type = raw.meal_type.as_deref().and_then(|t| match t.parse() {
            Ok(meal_type) => Some(meal_type),
            Err(_) => {
                tracing::warn!("Ignoring unrecognized meal type from analysis: {}", t);
                None
            }
        });

        tracing::debug!("Parsed analysis with {} foods", foods.len());
        Ok(Self { foods, meal_type })
    }

    /// Build a meal from this analysis
    ///
    /// The oracle's meal type wins over `fallback` when it reported one.
    pub fn into_meal(self, date: NaiveDate, time: NaiveTime, fallback: MealType) -> MealRecord {
        let meal_type = self.meal_type.unwrap_or(fallback);
        MealRecord::new(date, time, meal_type, self.foods)
    }
}

fn extract_json(response: &str) -> Result<String> {
    let trimmed = response.trim();
    if serde_json::from_str::<serde_json::Value>(trimmed).is_ok() {
        return Ok(trimmed.to_owned());
    }

    // Fenced block first so braces in surrounding prose don't interfere
    if let Some(start) = trimmed.find("```") {
        let body = &trimmed[start + 3..];
        let body = body.strip_prefix("json").unwrap_or(body);
        if let Some(end) = body.find("```") {
            let block = body[..end].trim();
            if serde_json::from_str::<serde_json::Value>(block).is_ok() {
                return Ok(block.to_owned());
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            let candidate = &trimmed[start..=end];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Ok(candidate.to_owned());
            }
        }
    }

    Err(Error::Analysis(
        "could not find a JSON object in the analysis reply".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedAnalyzer(&'static str);

    impl FoodAnalyzer for CannedAnalyzer {
        fn analyze(&self, _request: &AnalysisRequest) -> Result<FoodAnalysis> {
            FoodAnalysis::from_response(self.0)
        }
    }

    #[test]
    fn test_plain_json_with_camel_case_fields() {
        let reply = r#"{"foods":[{"name":"Grilled chicken","calories":330.4,"proteinGrams":62,"carbsGrams":0,"fatGrams":7.5}],"mealType":"dinner"}"#;
        let analysis = FoodAnalysis::from_response(reply).unwrap();
        assert_eq!(analysis.meal_type, Some(MealType::Dinner));
        assert_eq!(
            analysis.foods,
            vec![FoodItem {
                name: "Grilled chicken".into(),
                calories: 330,
                protein_grams: 62,
                carbs_grams: 0,
                fat_grams: 8,
            }]
        );
    }

    #[test]
    fn test_fenced_reply_with_prose() {
        let reply = "Here is my estimate {roughly}:\n```json\n{\"foods\": [{\"name\": \"rice\", \"calories\": 200, \"carbs\": 45}]}\n```\nEnjoy!";
        let analysis = FoodAnalysis::from_response(reply).unwrap();
        assert_eq!(analysis.foods.len(), 1);
        assert_eq!(analysis.foods[0].carbs_grams, 45);
        assert_eq!(analysis.foods[0].protein_grams, 0);
        assert_eq!(analysis.meal_type, None);
    }

    #[test]
    fn test_negative_values_clamp_to_zero() {
        let reply = r#"{"foods":[{"name":"mystery","calories":-50,"protein":-1}]}"#;
        let analysis = FoodAnalysis::from_response(reply).unwrap();
        assert_eq!(analysis.foods[0].calories, 0);
        assert_eq!(analysis.foods[0].protein_grams, 0);
    }

    #[test]
    fn test_empty_or_garbage_reply_is_error() {
        assert!(matches!(
            FoodAnalysis::from_response(r#"{"foods":[]}"#),
            Err(Error::Analysis(_))
        ));
        assert!(matches!(
            FoodAnalysis::from_response(r#"{"foods":[{"name":"  "}]}"#),
            Err(Error::Analysis(_))
        ));
        assert!(FoodAnalysis::from_response("I cannot see any food.").is_err());
    }

    #[test]
    fn test_unknown_meal_type_is_ignored() {
        let reply = r#"{"foods":[{"name":"tea","calories":2}],"mealType":"elevenses"}"#;
        let analysis = FoodAnalysis::from_response(reply).unwrap();
        assert_eq!(analysis.meal_type, None);
    }

    #[test]
    fn test_into_meal_keeps_order_and_totals() {
        let analyzer = CannedAnalyzer(
            r#"{"foods":[{"name":"toast","calories":160,"protein":6,"carbs":28,"fat":2},{"name":"egg","calories":78,"protein":6,"carbs":1,"fat":5}]}"#,
        );
        let analysis = analyzer
            .analyze(&AnalysisRequest::Text("toast and an egg".into()))
            .unwrap();
        let meal = analysis.into_meal(
            NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            NaiveTime::from_hms_opt(8, 15, 0).unwrap(),
            MealType::Breakfast,
        );
        assert_eq!(meal.meal_type, MealType::Breakfast);
        assert_eq!(meal.foods[0].name, "toast");
        assert_eq!(meal.foods[1].name, "egg");
        assert_eq!(meal.total_calories, 238);
        assert_eq!(meal.total_protein, 12);
        assert!(meal.validate().is_ok());
    }
}
