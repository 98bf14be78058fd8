//! Weather-driven styling suggestion engine.
//!
//! Pure and deterministic: identical inputs always produce the same ordered
//! list, no I/O, no hidden state. The branching lives in explicit ordered
//! rule tables so the tie-break order is data, not cascading conditionals:
//!
//! - temperature bands are first-match-wins, tested as `< bound` ascending;
//! - condition keyword rules are first-match-wins over case-insensitive
//!   substrings of the classifier;
//! - the occasion stage is independent and appends on top of both.
//!
//! A single fallback string is appended only if every stage contributed
//! nothing.

use crate::defaults::{DEFAULT_CONDITION, DEFAULT_HUMIDITY, DEFAULT_TEMPERATURE_C};
use crate::models::{Category, ClothingItem, Occasion, WeatherObservation};

/// Tags that count as outerwear (in addition to the outerwear category).
pub const OUTERWEAR_TAGS: &[&str] = &["jacket", "coat", "blazer", "cardigan"];

/// Tags that count as warm fabrics.
pub const WARM_TAGS: &[&str] = &["wool", "fleece", "thermal", "sweater"];

/// Tags that count as light fabrics.
pub const LIGHT_TAGS: &[&str] = &["cotton", "linen", "breathable", "light"];

/// Boolean features derived from scanning a wardrobe's categories and tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WardrobeSignal {
    pub has_outerwear: bool,
    pub has_warm_items: bool,
    pub has_light_items: bool,
}

impl WardrobeSignal {
    /// Scan a clothing list once; each flag is true if any item matches.
    pub fn from_items(items: &[ClothingItem]) -> Self {
        Self {
            has_outerwear: items.iter().any(|item| {
                item.category == Category::Outerwear || has_tag(&item.tags, OUTERWEAR_TAGS)
            }),
            has_warm_items: items.iter().any(|item| has_tag(&item.tags, WARM_TAGS)),
            has_light_items: items.iter().any(|item| has_tag(&item.tags, LIGHT_TAGS)),
        }
    }
}

fn has_tag(tags: &[String], keywords: &[&str]) -> bool {
    tags.iter()
        .any(|tag| keywords.contains(&tag.to_lowercase().as_str()))
}

/// Everything a rule may read, computed once up front.
struct RuleContext {
    temperature: i32,
    condition: String,
    humidity: i32,
    occasion: Occasion,
    signal: WardrobeSignal,
}

type Effect = fn(&RuleContext, &mut Vec<String>);

/// A temperature band: fires when `temperature < below`.
struct TemperatureBand {
    below: i32,
    effect: Effect,
}

/// Mutually exclusive temperature bands in ascending order; the final
/// open-ended band catches everything at or above 30 degrees.
const TEMPERATURE_BANDS: &[TemperatureBand] = &[
    TemperatureBand { below: 5, effect: very_cold },
    TemperatureBand { below: 10, effect: cold },
    TemperatureBand { below: 15, effect: cool },
    TemperatureBand { below: 20, effect: mild },
    TemperatureBand { below: 25, effect: pleasant },
    TemperatureBand { below: 30, effect: warm },
    TemperatureBand { below: i32::MAX, effect: hot },
];

/// A condition keyword rule: fires when any keyword is a substring of the
/// lowercased classifier.
struct ConditionRule {
    keywords: &'static [&'static str],
    effect: Effect,
}

/// Mutually exclusive condition rules in fixed priority order.
const CONDITION_RULES: &[ConditionRule] = &[
    ConditionRule { keywords: &["rain", "drizzle"], effect: rainy },
    ConditionRule { keywords: &["snow"], effect: snowy },
    ConditionRule { keywords: &["wind"], effect: windy },
    ConditionRule { keywords: &["cloud", "overcast"], effect: cloudy },
];

/// Produce an ordered list of styling suggestions for an observation, an
/// occasion, and the wardrobe under consideration.
///
/// Total over its input domain: missing temperature defaults to 20, missing
/// condition to "clear", missing humidity to 50. An empty wardrobe skips all
/// "you already have X" affirmations and enables the "consider adding X"
/// gap warnings.
pub fn suggest(
    observation: &WeatherObservation,
    occasion: Occasion,
    wardrobe: &[ClothingItem],
) -> Vec<String> {
    let ctx = RuleContext {
        temperature: observation.temperature.unwrap_or(DEFAULT_TEMPERATURE_C),
        condition: observation
            .condition
            .as_deref()
            .unwrap_or(DEFAULT_CONDITION)
            .to_lowercase(),
        humidity: observation.humidity.unwrap_or(DEFAULT_HUMIDITY),
        occasion,
        signal: WardrobeSignal::from_items(wardrobe),
    };

    let mut out = Vec::new();

    // Stage 1: temperature band, first match wins.
    if let Some(band) = TEMPERATURE_BANDS.iter().find(|b| ctx.temperature < b.below) {
        (band.effect)(&ctx, &mut out);
    }

    // Stage 2: condition keywords, first match wins.
    if let Some(rule) = CONDITION_RULES
        .iter()
        .find(|r| r.keywords.iter().any(|k| ctx.condition.contains(k)))
    {
        (rule.effect)(&ctx, &mut out);
    }

    // Stage 3: occasion extras (casual and "other" contribute nothing).
    occasion_effect(&ctx, &mut out);

    // Stage 4: fallback.
    if out.is_empty() {
        out.push("Perfect weather for your favorite outfit!".to_string());
    }

    out
}

fn push(out: &mut Vec<String>, s: &str) {
    out.push(s.to_string());
}

// =============================================================================
// TEMPERATURE BANDS
// =============================================================================

fn very_cold(ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Very cold - Layer up with multiple warm pieces");
    if !ctx.signal.has_outerwear {
        push(out, "Consider adding a heavy coat or jacket");
    }
    if !ctx.signal.has_warm_items {
        push(out, "Add thermal layers or wool items for extra warmth");
    }
    push(out, "Don't forget gloves, scarf, and warm hat");
    push(out, "Waterproof boots with insulation recommended");
}

fn cold(ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Cold weather - Wear a warm coat or heavy jacket");
    if ctx.signal.has_warm_items {
        push(out, "Your warm items are perfect for this weather");
    }
    push(out, "Layer with sweaters or cardigans");
    push(out, "Closed-toe shoes or boots recommended");
}

fn cool(ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Cool weather - Light to medium jacket recommended");
    push(out, "Long sleeves and layers work well");
    if ctx.signal.has_light_items {
        push(out, "You can mix light and medium layers");
    }
}

fn mild(_ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Mild weather - Light jacket or cardigan optional");
    push(out, "Long or short sleeves both work");
    push(out, "Jeans or light pants comfortable");
}

fn pleasant(ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Pleasant weather - Light, comfortable clothing");
    if ctx.signal.has_light_items {
        push(out, "Your light fabrics are perfect for today");
    }
    push(out, "Short sleeves or light long sleeves");
    push(out, "Comfortable shoes for walking");
}

fn warm(ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Warm weather - Light, breathable fabrics");
    push(out, "Short sleeves and light colors recommended");
    push(out, "Shorts or light pants would be comfortable");
    push(out, "Sun protection: hat and sunglasses");
    if ctx.humidity > 70 {
        push(out, "High humidity - Choose moisture-wicking fabrics");
    }
}

fn hot(ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Hot weather - Very light, breathable clothing essential");
    push(out, "Short sleeves, tank tops, or sleeveless");
    push(out, "Shorts or very light pants");
    push(out, "Sun protection is crucial - hat, sunglasses, sunscreen");
    push(out, "Stay hydrated and choose light colors");
    if ctx.humidity > 70 {
        push(out, "High humidity - Avoid heavy fabrics, choose cotton or linen");
    }
}

// =============================================================================
// CONDITION RULES
// =============================================================================

fn rainy(_ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Rainy weather - Waterproof outerwear essential");
    push(out, "Bring an umbrella or wear a raincoat");
    push(out, "Waterproof or water-resistant footwear");
    push(out, "Avoid suede, leather, and delicate fabrics");
    push(out, "Protect bags and electronics");
}

fn snowy(_ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Snowy weather - Warm, insulated layers");
    push(out, "Heavy winter coat with insulation");
    push(out, "Waterproof boots with good traction");
    push(out, "Gloves, hat, and scarf essential");
    push(out, "Waterproof or water-resistant pants if possible");
}

fn windy(_ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Windy conditions - Secure your accessories");
    push(out, "Windbreaker or light jacket recommended");
    push(out, "Avoid loose hats or accessories");
    push(out, "Avoid very loose or flowy clothing");
}

fn cloudy(_ctx: &RuleContext, out: &mut Vec<String>) {
    push(out, "Cloudy skies - Temperature may feel cooler");
    push(out, "Light layer recommended even if temperature seems warm");
}

// =============================================================================
// OCCASION STAGE
// =============================================================================

fn occasion_effect(ctx: &RuleContext, out: &mut Vec<String>) {
    match ctx.occasion {
        Occasion::Formal => {
            push(out, "Formal occasion - Dress appropriately");
            push(out, "Consider suit or dress code requirements");
            push(out, "Formal footwear required");
            if ctx.temperature < 15 {
                push(out, "Formal coat or blazer for outdoor portions");
            }
        }
        Occasion::Sporty => {
            push(out, "Active wear - Comfortable, moisture-wicking fabrics");
            push(out, "Athletic shoes essential");
            push(out, "Stay hydrated during activity");
            if ctx.temperature > 25 {
                push(out, "Light, breathable athletic wear");
            } else if ctx.temperature < 15 {
                push(out, "Light athletic jacket for warm-up");
            }
        }
        Occasion::Party => {
            push(out, "Party time - Dress to impress while staying comfortable");
            if ctx.temperature < 15 {
                push(out, "Bring a stylish jacket or coat for outdoor areas");
            }
        }
        Occasion::Work => {
            push(out, "Professional attire appropriate");
            push(out, "Consider office dress code");
            if ctx.temperature > 25 {
                push(out, "Light, professional fabrics for comfort");
            }
        }
        Occasion::Casual | Occasion::Other => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::new_v7;
    use chrono::Utc;

    fn item(category: Category, tags: &[&str]) -> ClothingItem {
        let now = Utc::now();
        ClothingItem {
            id: new_v7(),
            user_id: new_v7(),
            name: "test item".to_string(),
            category,
            color: "black".to_string(),
            brand: None,
            size: None,
            image_url: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            seasons: vec![],
            occasions: vec![],
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn obs(temperature: i32) -> WeatherObservation {
        WeatherObservation {
            temperature: Some(temperature),
            ..Default::default()
        }
    }

    #[test]
    fn test_deterministic_output() {
        let observation = WeatherObservation {
            temperature: Some(12),
            condition: Some("Rain".to_string()),
            humidity: Some(80),
            ..Default::default()
        };
        let wardrobe = vec![item(Category::Outerwear, &["wool"])];
        let a = suggest(&observation, Occasion::Work, &wardrobe);
        let b = suggest(&observation, Occasion::Work, &wardrobe);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_all_defaults_non_empty() {
        // The default temperature of 20 is not < 20, so it lands in the
        // pleasant band; no condition keyword, casual occasion.
        let out = suggest(&WeatherObservation::default(), Occasion::Casual, &[]);
        assert!(!out.is_empty());
        assert_eq!(out[0], "Pleasant weather - Light, comfortable clothing");
    }

    #[test]
    fn test_very_cold_empty_wardrobe_fires_gap_warnings() {
        let out = suggest(&obs(2), Occasion::Casual, &[]);
        assert!(out.contains(&"Very cold - Layer up with multiple warm pieces".to_string()));
        assert!(out.contains(&"Consider adding a heavy coat or jacket".to_string()));
        assert!(out.contains(&"Add thermal layers or wool items for extra warmth".to_string()));
    }

    #[test]
    fn test_very_cold_outerwear_suppresses_coat_warning() {
        let wardrobe = vec![item(Category::Outerwear, &[])];
        let out = suggest(&obs(2), Occasion::Casual, &wardrobe);
        assert!(!out.contains(&"Consider adding a heavy coat or jacket".to_string()));
        // No warm tags, so the thermal suggestion still fires.
        assert!(out.contains(&"Add thermal layers or wool items for extra warmth".to_string()));
    }

    #[test]
    fn test_outerwear_tag_counts_as_outerwear() {
        let wardrobe = vec![item(Category::Top, &["Blazer"])];
        let out = suggest(&obs(2), Occasion::Casual, &wardrobe);
        assert!(!out.contains(&"Consider adding a heavy coat or jacket".to_string()));
    }

    #[test]
    fn test_warm_humid_adds_moisture_wicking() {
        let observation = WeatherObservation {
            temperature: Some(28),
            humidity: Some(80),
            ..Default::default()
        };
        let out = suggest(&observation, Occasion::Casual, &[]);
        assert!(out.contains(&"Warm weather - Light, breathable fabrics".to_string()));
        assert!(out.contains(&"High humidity - Choose moisture-wicking fabrics".to_string()));
    }

    #[test]
    fn test_warm_default_humidity_skips_moisture_wicking() {
        let out = suggest(&obs(28), Occasion::Casual, &[]);
        assert!(!out.contains(&"High humidity - Choose moisture-wicking fabrics".to_string()));
    }

    #[test]
    fn test_mild_rain_combines_temperature_and_condition() {
        let observation = WeatherObservation {
            temperature: Some(18),
            condition: Some("Rain".to_string()),
            ..Default::default()
        };
        let out = suggest(&observation, Occasion::Casual, &[]);
        assert!(out.contains(&"Mild weather - Light jacket or cardigan optional".to_string()));
        assert!(out.contains(&"Rainy weather - Waterproof outerwear essential".to_string()));
        // Temperature strings come before condition strings.
        let temp_idx = out
            .iter()
            .position(|s| s.starts_with("Mild weather"))
            .unwrap();
        let cond_idx = out
            .iter()
            .position(|s| s.starts_with("Rainy weather"))
            .unwrap();
        assert!(temp_idx < cond_idx);
    }

    #[test]
    fn test_formal_cold_adds_outdoor_coat() {
        let out = suggest(&obs(10), Occasion::Formal, &[]);
        assert!(out.contains(&"Formal occasion - Dress appropriately".to_string()));
        assert!(out.contains(&"Formal coat or blazer for outdoor portions".to_string()));
    }

    #[test]
    fn test_formal_mild_skips_outdoor_coat() {
        let out = suggest(&obs(18), Occasion::Formal, &[]);
        assert!(out.contains(&"Formal occasion - Dress appropriately".to_string()));
        assert!(!out.contains(&"Formal coat or blazer for outdoor portions".to_string()));
    }

    #[test]
    fn test_band_boundaries_first_match_wins() {
        // 4 is very cold, 5 falls through to the cold band.
        let out4 = suggest(&obs(4), Occasion::Casual, &[]);
        assert!(out4[0].starts_with("Very cold"));
        let out5 = suggest(&obs(5), Occasion::Casual, &[]);
        assert!(out5[0].starts_with("Cold weather"));
        // 30 is the open-ended hot band.
        let out30 = suggest(&obs(30), Occasion::Casual, &[]);
        assert!(out30[0].starts_with("Hot weather"));
    }

    #[test]
    fn test_condition_priority_rain_beats_cloud() {
        let observation = WeatherObservation {
            temperature: Some(18),
            condition: Some("Rainy clouds".to_string()),
            ..Default::default()
        };
        let out = suggest(&observation, Occasion::Casual, &[]);
        assert!(out.contains(&"Rainy weather - Waterproof outerwear essential".to_string()));
        assert!(!out.contains(&"Cloudy skies - Temperature may feel cooler".to_string()));
    }

    #[test]
    fn test_condition_matching_is_case_insensitive() {
        let observation = WeatherObservation {
            temperature: Some(18),
            condition: Some("DRIZZLE".to_string()),
            ..Default::default()
        };
        let out = suggest(&observation, Occasion::Casual, &[]);
        assert!(out.contains(&"Bring an umbrella or wear a raincoat".to_string()));
    }

    #[test]
    fn test_sporty_temperature_conditioned_extras() {
        let out_hot = suggest(&obs(28), Occasion::Sporty, &[]);
        assert!(out_hot.contains(&"Light, breathable athletic wear".to_string()));
        let out_cold = suggest(&obs(10), Occasion::Sporty, &[]);
        assert!(out_cold.contains(&"Light athletic jacket for warm-up".to_string()));
        let out_mid = suggest(&obs(20), Occasion::Sporty, &[]);
        assert!(!out_mid.contains(&"Light, breathable athletic wear".to_string()));
        assert!(!out_mid.contains(&"Light athletic jacket for warm-up".to_string()));
    }

    #[test]
    fn test_pleasant_band_affirms_light_items() {
        let wardrobe = vec![item(Category::Top, &["linen"])];
        let out = suggest(&obs(22), Occasion::Casual, &wardrobe);
        assert!(out.contains(&"Your light fabrics are perfect for today".to_string()));
        let out_empty = suggest(&obs(22), Occasion::Casual, &[]);
        assert!(!out_empty.contains(&"Your light fabrics are perfect for today".to_string()));
    }

    #[test]
    fn test_zero_degrees_is_a_real_temperature() {
        // 0 must hit the very-cold band, not be treated as missing.
        let out = suggest(&obs(0), Occasion::Casual, &[]);
        assert!(out[0].starts_with("Very cold"));
    }

    #[test]
    fn test_wardrobe_signal_scan() {
        let items = vec![
            item(Category::Top, &["Wool", "vintage"]),
            item(Category::Shoes, &[]),
        ];
        let signal = WardrobeSignal::from_items(&items);
        assert!(signal.has_warm_items);
        assert!(!signal.has_outerwear);
        assert!(!signal.has_light_items);
        assert_eq!(WardrobeSignal::from_items(&[]), WardrobeSignal::default());
    }

    #[test]
    fn test_tag_match_is_exact_membership_not_substring() {
        // "woolly" is not the "wool" tag.
        let items = vec![item(Category::Top, &["woolly"])];
        assert!(!WardrobeSignal::from_items(&items).has_warm_items);
    }
}
