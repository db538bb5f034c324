//! Output formatting module

use mitsumori_domain::service::{format_cost_range, resolve_line_item, EditSession};
use mitsumori_types::{
    BatchReport, Category, CompanyInfo, ItemMaster, OutputFormat, Product, QuotationDocument,
    QuotationResult, QuotationTemplate, Result,
};
use mitsumori_vision::StylePreset;
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Display width of a string (full-width characters count double)
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
}

/// Left-align `s` in a column of `width` display cells
fn pad(s: &str, width: usize) -> String {
    let w = display_width(s);
    if w >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - w))
    }
}

fn print_items(result: &QuotationResult) {
    println!("{:>3}  {}  {:>10}  {:>10}", "#", pad("工事項目", 30), "最小(円)", "最大(円)");
    println!("{}", "-".repeat(64));
    for (index, item) in result.items.iter().enumerate() {
        let resolved = resolve_line_item(&item.name, &item.cost_range);
        println!(
            "{:>3}  {}  {:>10.0}  {:>10.0}   {}",
            index,
            pad(&resolved.name, 30),
            resolved.range.min,
            resolved.range.max,
            item.cost_range
        );
    }
    println!("{}", "-".repeat(64));
}

pub fn output_quotation(output_format: OutputFormat, result: &QuotationResult) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(result);
    }

    println!("\nQuotation");
    println!("=========");
    print_items(result);

    let computed = format_cost_range(EditSession::from_result(result).total().cost_range_yen());
    println!("合計: {}", result.total_cost_range);
    if computed != result.total_cost_range {
        println!("      (items add up to {})", computed);
    }
    if !result.notes.is_empty() {
        println!("\n備考:\n{}", result.notes);
    }
    Ok(())
}

pub fn output_document(output_format: OutputFormat, document: &QuotationDocument) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(document);
    }

    println!("\n{} ({})", document.title, document.id);
    if !document.customer_name.is_empty() {
        println!("Customer:  {}", document.customer_name);
    }
    println!("Updated:   {}", document.updated_at.format("%Y-%m-%d %H:%M"));
    if let Some(ref path) = document.before_image {
        println!("Before:    {}", path);
    }
    if let Some(ref path) = document.after_image {
        println!("After:     {}", path);
    }
    output_quotation(output_format, &document.result)
}

pub fn output_documents(output_format: OutputFormat, documents: &[QuotationDocument], limit: usize) -> Result<()> {
    if output_format == OutputFormat::Json {
        let shown: Vec<_> = documents.iter().take(limit).collect();
        return print_json(&shown);
    }

    println!("Quotations: {}", documents.len());
    if documents.is_empty() {
        println!("No quotations found.");
        return Ok(());
    }
    println!("{:<36}  {:<16}  {}  {}", "ID", "Updated", pad("Title", 24), "Total");
    println!("{}", "-".repeat(96));
    for document in documents.iter().take(limit) {
        println!(
            "{:<36}  {:<16}  {}  {}",
            document.id,
            document.updated_at.format("%Y-%m-%d %H:%M"),
            pad(&document.title, 24),
            document.result.total_cost_range
        );
    }
    Ok(())
}

pub fn output_categories(output_format: OutputFormat, categories: &[Category]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(categories);
    }
    if categories.is_empty() {
        println!("No categories found.");
        return Ok(());
    }
    for category in categories {
        println!("{:<36}  {}  {}", category.id, pad(category.kind.label(), 8), category.name);
    }
    Ok(())
}

pub fn output_products(output_format: OutputFormat, products: &[Product]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(products);
    }
    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    for product in products {
        println!(
            "{:<36}  {}  {}  {:>8}円/{}  {}",
            product.id,
            pad(&product.model_number, 12),
            pad(&product.name, 24),
            product.unit_price,
            if product.unit.is_empty() { "-" } else { &product.unit },
            if product.image_path.is_some() { "[image]" } else { "" }
        );
    }
    Ok(())
}

pub fn output_item_masters(output_format: OutputFormat, items: &[ItemMaster]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(items);
    }
    if items.is_empty() {
        println!("No item masters found.");
        return Ok(());
    }
    for item in items {
        println!(
            "{}  {:>8}〜{:>8}円/{}",
            pad(&item.name, 24),
            item.unit_price_min,
            item.unit_price_max,
            if item.unit.is_empty() { "式" } else { &item.unit }
        );
    }
    Ok(())
}

pub fn output_templates(output_format: OutputFormat, templates: &[QuotationTemplate]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(templates);
    }
    if templates.is_empty() {
        println!("No templates found.");
        return Ok(());
    }
    for template in templates {
        println!("{:<36}  {}  ({} items)", template.id, template.name, template.items.len());
    }
    Ok(())
}

pub fn output_batch_report(output_format: OutputFormat, report: &BatchReport) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(report);
    }
    println!("Succeeded: {}", report.succeeded.len());
    println!("Failed:    {}", report.failed.len());
    for failure in &report.failed {
        println!("  {}: {}", failure.item, failure.reason);
    }
    Ok(())
}

pub fn output_presets(output_format: OutputFormat, presets: &[&StylePreset]) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(presets);
    }
    for preset in presets {
        println!("{:<16}  {}  {}", preset.id, pad(preset.scope.label(), 4), preset.label);
    }
    Ok(())
}

pub fn output_company(output_format: OutputFormat, company: Option<&CompanyInfo>) -> Result<()> {
    if output_format == OutputFormat::Json {
        return print_json(&company);
    }
    let Some(company) = company else {
        println!("Company information is not set.");
        println!("Set it with: mitsumori company set --name <NAME>");
        return Ok(());
    };
    println!("会社名:   {}", company.company_name);
    println!("住所:     {}", company.address);
    println!("電話:     {}", company.phone);
    println!("代表者:   {}", company.representative);
    println!("ロゴ:     {}", company.logo_path.as_deref().unwrap_or("-"));
    Ok(())
}
