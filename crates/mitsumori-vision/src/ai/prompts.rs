//! Prompt assembly for rendering, quotation estimation and chat
//!
//! Language convention:
//! - English for model instructions (keep, replace, output, ...)
//! - Japanese for construction and product terms the model must echo back
//!   (クロス張替え, 万円, ...), since quotations are shown to Japanese customers

use mitsumori_types::{ItemMaster, Product, RenovationScope};

use crate::chat::{AssistantKind, ChatRole, ChatTurn};
use crate::presets::StylePreset;

/// Catalog product the rendering should use
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductReference {
    pub name: String,
    pub maker: String,
    pub model_number: String,
}

impl From<&Product> for ProductReference {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            maker: product.maker.clone(),
            model_number: product.model_number.clone(),
        }
    }
}

/// Optional user choices on top of a preset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// 壁の色 (e.g. "オフホワイト")
    pub wall_color: Option<String>,
    /// 床材 (e.g. "無垢フローリング")
    pub floor_material: Option<String>,
    pub products: Vec<ProductReference>,
    /// Free-text request from the customer
    pub request: Option<String>,
}

/// Most recent turns kept in a chat prompt
const MAX_HISTORY_TURNS: usize = 20;

pub fn build_renovation_prompt(preset: &StylePreset, options: &RenderOptions) -> String {
    let subject = match preset.scope {
        RenovationScope::Interior => "room",
        RenovationScope::Exterior => "building exterior",
    };

    let mut prompt = format!(
        "Edit this photo of a {subject} to show it after renovation ({label}).\n\
         Keep the camera angle, perspective, room layout, windows and structural elements exactly as they are.\n\
         Only change finishes, colors, materials and furnishings.\n\n\
         Style: {style}.\n",
        subject = subject,
        label = preset.label,
        style = preset.prompt,
    );

    if let Some(color) = options.wall_color.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("Wall color (壁の色): {}.\n", color.trim()));
    }
    if let Some(floor) = options.floor_material.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("Floor material (床材): {}.\n", floor.trim()));
    }
    if !options.products.is_empty() {
        prompt.push_str("Use these catalog products where they fit:\n");
        for product in &options.products {
            prompt.push_str(&format!("- {}", product.name));
            let detail: Vec<&str> = [product.maker.as_str(), product.model_number.as_str()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect();
            if !detail.is_empty() {
                prompt.push_str(&format!(" ({})", detail.join(" ")));
            }
            prompt.push('\n');
        }
    }
    if let Some(request) = options.request.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("Customer request (お客様のご要望): {}\n", request.trim()));
    }

    prompt.push_str("\nReturn the edited photo as a single photorealistic image.");
    prompt
}

pub fn build_quotation_prompt(scope: RenovationScope, item_masters: &[ItemMaster]) -> String {
    let mut prompt = format!(
        "You are a Japanese renovation estimator. The first image is the current {} (before),\n\
         the second image is the planned result (after).\n\
         Compare them and list every construction item needed to get from before to after.\n\n\
         Rules:\n\
         - Item names in Japanese (e.g. クロス張替え, 床材工事, 外壁塗装).\n\
         - cost_range as Japanese text in 万円, a single amount (\"12万円\") or a band (\"5万円〜8万円\").\n\
         - total_cost_range is the sum of the item bands written the same way.\n\
         - notes: assumptions and exclusions in Japanese (one or two sentences).\n",
        match scope {
            RenovationScope::Interior => "interior (内装)",
            RenovationScope::Exterior => "exterior (外装)",
        }
    );

    if !item_masters.is_empty() {
        prompt.push_str("\nReference unit prices (工事項目マスタ):\n");
        for item in item_masters {
            prompt.push_str(&format!(
                "- {}: {}〜{}円/{}\n",
                item.name,
                item.unit_price_min,
                item.unit_price_max,
                if item.unit.is_empty() { "式" } else { &item.unit }
            ));
        }
    }

    prompt.push_str(
        r#"
Answer with JSON only, in this shape:
{"items": [{"name": "<工事項目名>", "cost_range": "<金額>"}], "total_cost_range": "<合計金額>", "notes": "<備考>"}"#,
    );
    prompt
}

fn persona(kind: AssistantKind) -> &'static str {
    match kind {
        AssistantKind::Help => {
            "You are the support assistant of a renovation visualization and quotation app.\n\
             Explain in polite Japanese (です・ます調) how to upload photos, choose a style preset,\n\
             generate the after image, edit quotation items (金額は万円単位で入力) and export the quotation.\n\
             If a question is not about the app, say briefly that you can only help with the app."
        }
        AssistantKind::SalesCoach => {
            "You coach renovation sales staff. Answer in Japanese with concrete talk scripts,\n\
             how to present before/after images, how to explain cost bands (〜万円) honestly,\n\
             and how to handle objections about price and schedule. Keep answers short and practical."
        }
    }
}

/// Persona instructions, recent history and the new question
pub fn build_chat_prompt(kind: AssistantKind, history: &[ChatTurn], question: &str) -> String {
    let mut prompt = String::from(persona(kind));
    prompt.push_str("\n\n");

    let start = history.len().saturating_sub(MAX_HISTORY_TURNS);
    if start < history.len() {
        prompt.push_str("Conversation so far:\n");
        for turn in &history[start..] {
            let speaker = match turn.role {
                ChatRole::User => "User",
                ChatRole::Assistant => "Assistant",
            };
            prompt.push_str(&format!("{}: {}\n", speaker, turn.text));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("User: {}\nAssistant:", question.trim()));
    prompt
}

pub fn build_help_prompt(history: &[ChatTurn], question: &str) -> String {
    build_chat_prompt(AssistantKind::Help, history, question)
}

pub fn build_sales_coach_prompt(history: &[ChatTurn], question: &str) -> String {
    build_chat_prompt(AssistantKind::SalesCoach, history, question)
}
