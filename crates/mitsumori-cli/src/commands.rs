//! Command handlers

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use mitsumori_app::app::{
    CatalogService, CatalogServiceError, ChatAssistant, EditOp, QuotationService,
    QuotationServiceError, VisualizationService,
};
use mitsumori_app::config::Config;
use mitsumori_app::export::export_quotation;
use mitsumori_app::repository::Repositories;
use mitsumori_app::scanner::validate_image;
use mitsumori_domain::repository::{CompanyInfoRepository, ImageRepository, ProductRepository};
use mitsumori_domain::service::{format_cost_range, resolve_line_item};
use mitsumori_types::{CostRange, Error, OutputFormat, Product, RenovationScope, Result};
use mitsumori_vision::{presets_for, AssistantKind, ProductReference, RenderOptions, PRESETS};

use crate::cli::{
    CatalogCommand, CategoryCommand, ChatCommand, Cli, Commands, CompanyCommand, CostCommand,
    MasterCommand, ProductCommand, QuoteCommand, TemplateCommand,
};
use crate::output::{
    output_batch_report, output_categories, output_company, output_document, output_documents,
    output_item_masters, output_presets, output_products, output_quotation, output_templates,
    print_json,
};

fn catalog_err(e: CatalogServiceError) -> Error {
    Error::CatalogFailed(e.to_string())
}

fn quote_err(e: QuotationServiceError) -> Error {
    Error::QuotationFailed(e.to_string())
}

/// Execute CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    // Override from CLI args
    if let Some(ref command) = cli.backend_command {
        config.backend_command = Some(command.clone());
    }
    if cli.model.is_some() {
        config.chat_model = cli.model.clone();
    }
    if cli.image_model.is_some() {
        config.image_model = cli.image_model.clone();
    }
    if cli.store_dir.is_some() {
        config.store_dir = cli.store_dir.clone();
    }
    let output_format = cli.format.unwrap_or(config.output_format);

    match cli.command {
        Commands::Cost(command) => cmd_cost(command, output_format),
        Commands::Quote(command) => cmd_quote(&config, command, output_format),
        Commands::Catalog(command) => cmd_catalog(&config, command, output_format),
        Commands::Master(command) => cmd_master(&config, command, output_format),
        Commands::Template(command) => cmd_template(&config, command, output_format),
        Commands::Company(command) => cmd_company(&config, command, output_format),
        Commands::Render {
            before,
            preset,
            wall_color,
            floor,
            products,
            request,
            output,
            save,
        } => {
            let repos = Repositories::open(&config)?;
            let options = RenderOptions {
                wall_color,
                floor_material: floor,
                products: product_references(&repos.products, &products)?,
                request,
            };
            cmd_render(&config, &repos, &before, &preset, &options, output, save)
        }
        Commands::Chat(command) => {
            let (kind, question) = match command {
                ChatCommand::Support { question } => (AssistantKind::Help, question),
                ChatCommand::Sales { question } => (AssistantKind::SalesCoach, question),
            };
            cmd_chat(&config, kind, question)
        }
        Commands::Presets { scope } => {
            let presets: Vec<_> = match scope {
                Some(scope) => presets_for(scope).collect(),
                None => PRESETS.iter().collect(),
            };
            output_presets(output_format, &presets)
        }
        Commands::Config {
            show,
            set_backend_command,
            set_image_model,
            set_chat_model,
            set_store_dir,
            set_output,
            set_temperature,
            reset,
        } => cmd_config(
            show,
            set_backend_command,
            set_image_model,
            set_chat_model,
            set_store_dir,
            set_output,
            set_temperature,
            reset,
        ),
    }
}

fn cmd_cost(command: CostCommand, output_format: OutputFormat) -> Result<()> {
    let (name, range) = match command {
        CostCommand::Parse { text, name } => {
            let resolved = resolve_line_item(name.as_deref().unwrap_or(""), &text);
            (Some(resolved.name), resolved.range)
        }
        CostCommand::Format { min, max } => {
            let max = max.unwrap_or(min);
            if ![min, max].iter().all(|n| n.is_finite() && *n >= 0.0) {
                return Err(Error::InvalidInput(format!("amounts must be non-negative: {} {}", min, max)));
            }
            (None, CostRange::new(min.min(max), min.max(max)))
        }
    };

    let formatted = format_cost_range(range);
    if output_format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "name": name,
            "min": range.min,
            "max": range.max,
            "formatted": formatted,
        }));
    }

    if let Some(name) = name.filter(|n| !n.is_empty()) {
        println!("Name:  {}", name);
    }
    println!("Min:   {:.0}円", range.min);
    println!("Max:   {:.0}円", range.max);
    println!("Band:  {}", formatted);
    Ok(())
}

fn quotation_service(repos: &Repositories) -> QuotationService<'_> {
    QuotationService::new(&repos.quotations, &repos.templates, &repos.item_masters, &repos.images)
}

fn catalog_service(repos: &Repositories) -> CatalogService<'_> {
    CatalogService::new(&repos.categories, &repos.products, &repos.images)
}

fn cmd_quote(config: &Config, command: QuoteCommand, output_format: OutputFormat) -> Result<()> {
    let repos = Repositories::open(config)?;
    let service = quotation_service(&repos);

    match command {
        QuoteCommand::Estimate {
            before,
            after,
            scope,
            save_as,
            customer,
        } => cmd_estimate(config, &service, &before, &after, scope, save_as, &customer, output_format),

        QuoteCommand::Show { id } => {
            let document = service.get_document(&id).map_err(quote_err)?;
            output_document(output_format, &document)
        }

        QuoteCommand::Edit {
            id,
            set_name,
            set_cost,
            add,
            remove,
            notes,
        } => {
            let ops = build_edit_ops(&set_name, &set_cost, &add, &remove)?;
            if ops.is_empty() && notes.is_none() {
                eprintln!("Nothing to edit. See: mitsumori quote edit --help");
                return Ok(());
            }
            let document = service
                .edit_document(&id, &ops, notes.as_deref())
                .map_err(quote_err)?;
            eprintln!("Quotation {} updated", document.id);
            output_document(output_format, &document)
        }

        QuoteCommand::List { limit } => {
            let documents = service.list_documents().map_err(quote_err)?;
            output_documents(output_format, &documents, limit)
        }

        QuoteCommand::Delete { id } => {
            service.delete_document(&id).map_err(quote_err)?;
            println!("Deleted quotation {}", id);
            Ok(())
        }

        QuoteCommand::Export { id, output } => {
            let document = service.get_document(&id).map_err(quote_err)?;
            let company = repos.company.load()?;
            let output = output.unwrap_or_else(|| PathBuf::from(format!("見積書_{}.xlsx", document.id)));
            export_quotation(&document, company.as_ref(), &output)?;
            println!("Exported to: {}", output.display());
            Ok(())
        }

        QuoteCommand::FromTemplate {
            template_id,
            title,
            customer,
        } => {
            let result = service.apply_template(&template_id).map_err(quote_err)?;
            let document = service
                .create_document(&title, &customer, result, None, None)
                .map_err(quote_err)?;
            eprintln!("Created quotation {}", document.id);
            output_document(output_format, &document)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_estimate(
    config: &Config,
    service: &QuotationService<'_>,
    before: &Path,
    after: &Path,
    scope: RenovationScope,
    save_as: Option<String>,
    customer: &str,
    output_format: OutputFormat,
) -> Result<()> {
    let backend = config.backend()?;
    let inference = config.inference_config();

    eprintln!("Estimating {} renovation from {} ...", scope.label(), after.display());
    let result = service
        .estimate(&backend, &inference, before, after, scope)
        .map_err(quote_err)?;

    if let Some(title) = save_as {
        let document = service
            .create_document(&title, customer, result.clone(), Some(before), Some(after))
            .map_err(quote_err)?;
        eprintln!("Saved as quotation {}", document.id);
    }

    output_quotation(output_format, &result)
}

/// Split "KEY=VALUE" at the last '='
fn split_assignment(arg: &str) -> Result<(&str, &str)> {
    arg.rsplit_once('=')
        .map(|(key, value)| (key.trim(), value.trim()))
        .ok_or_else(|| Error::QuotationFailed(format!("expected KEY=VALUE, got '{}'", arg)))
}

fn parse_index(text: &str) -> Result<usize> {
    text.parse()
        .map_err(|_| Error::QuotationFailed(format!("invalid item index '{}'", text)))
}

/// Parse a man-yen band: "5", "5-8", "5〜8" or "5~8"
fn parse_man_band(text: &str) -> Result<(f64, f64)> {
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .ok_or_else(|| Error::QuotationFailed(format!("invalid amount '{}' (万円)", text)))
    };
    match text.split_once(['-', '〜', '~']) {
        Some((min, max)) => {
            let (min, max) = (parse(min)?, parse(max)?);
            if min > max {
                return Err(Error::QuotationFailed(format!(
                    "minimum exceeds maximum in '{}' (万円)",
                    text
                )));
            }
            Ok((min, max))
        }
        None => {
            let amount = parse(text)?;
            Ok((amount, amount))
        }
    }
}

/// Edits in application order: renames, costs, additions, then removals
/// from the highest index down.
fn build_edit_ops(
    set_name: &[String],
    set_cost: &[String],
    add: &[String],
    remove: &[usize],
) -> Result<Vec<EditOp>> {
    let mut ops = Vec::new();

    for arg in set_name {
        let (index, name) = arg
            .split_once('=')
            .ok_or_else(|| Error::QuotationFailed(format!("expected INDEX=NAME, got '{}'", arg)))?;
        ops.push(EditOp::SetName {
            index: parse_index(index.trim())?,
            name: name.trim().to_string(),
        });
    }

    for arg in set_cost {
        let (index, band) = split_assignment(arg)?;
        let (min_man, max_man) = parse_man_band(band)?;
        ops.push(EditOp::SetCost {
            index: parse_index(index)?,
            min_man,
            max_man,
        });
    }

    for arg in add {
        let (name, band) = split_assignment(arg)?;
        let (min_man, max_man) = parse_man_band(band)?;
        ops.push(EditOp::Add {
            name: name.to_string(),
            min_man,
            max_man,
        });
    }

    let mut removals = remove.to_vec();
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    ops.extend(removals.into_iter().map(|index| EditOp::Remove { index }));

    Ok(ops)
}

fn cmd_catalog(config: &Config, command: CatalogCommand, output_format: OutputFormat) -> Result<()> {
    let repos = Repositories::open(config)?;
    let service = catalog_service(&repos);

    match command {
        CatalogCommand::Category(CategoryCommand::Add { name, kind }) => {
            let category = service.add_category(&name, kind).map_err(catalog_err)?;
            println!("Added category {} ({})", category.name, category.id);
            Ok(())
        }
        CatalogCommand::Category(CategoryCommand::List) => {
            let categories = service.list_categories().map_err(catalog_err)?;
            output_categories(output_format, &categories)
        }
        CatalogCommand::Category(CategoryCommand::Delete { id }) => {
            let removed = service.delete_category(&id).map_err(catalog_err)?;
            println!("Deleted category {} and {} product(s)", id, removed);
            Ok(())
        }

        CatalogCommand::Product(ProductCommand::Add {
            category,
            name,
            maker,
            model_number,
            price,
            unit,
            description,
        }) => {
            let mut product = Product::new(category, name);
            product.maker = maker;
            product.model_number = model_number;
            product.unit_price = price;
            product.unit = unit;
            product.description = description;
            let product = service.add_product(product).map_err(catalog_err)?;
            println!("Added product {} ({})", product.name, product.id);
            Ok(())
        }
        CatalogCommand::Product(ProductCommand::List { category }) => {
            let products = service.list_products(category.as_deref()).map_err(catalog_err)?;
            output_products(output_format, &products)
        }
        CatalogCommand::Product(ProductCommand::Delete { ids }) => {
            let report = service.delete_products(&ids);
            output_batch_report(output_format, &report)
        }
        CatalogCommand::Product(ProductCommand::Import { csv, category }) => {
            let products = service
                .import_products_csv(&csv, &category)
                .map_err(catalog_err)?;
            eprintln!("Imported {} product(s) from {}", products.len(), csv.display());
            output_products(output_format, &products)
        }
        CatalogCommand::Product(ProductCommand::UploadImages { dir }) => {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .map_err(|e| Error::CatalogFailed(e.to_string()))?
                    .progress_chars("#>-"),
            );
            pb.set_message("uploading");

            let report = service
                .upload_product_images(&dir, |done, total| {
                    pb.set_length(total as u64);
                    pb.set_position(done as u64);
                })
                .map_err(catalog_err)?;
            pb.finish_with_message("done");

            output_batch_report(output_format, &report)
        }
    }
}

fn cmd_master(config: &Config, command: MasterCommand, output_format: OutputFormat) -> Result<()> {
    let repos = Repositories::open(config)?;
    let service = quotation_service(&repos);

    match command {
        MasterCommand::Import { toml } => {
            let (imported, replaced) = service.import_item_masters(&toml).map_err(quote_err)?;
            println!("Imported {} item master(s) ({} replaced)", imported, replaced);
            Ok(())
        }
        MasterCommand::List => {
            let items = service.list_item_masters().map_err(quote_err)?;
            output_item_masters(output_format, &items)
        }
    }
}

fn cmd_template(config: &Config, command: TemplateCommand, output_format: OutputFormat) -> Result<()> {
    let repos = Repositories::open(config)?;
    let service = quotation_service(&repos);

    match command {
        TemplateCommand::Add { name, from_quote } => {
            let document = service.get_document(&from_quote).map_err(quote_err)?;
            let template = service
                .save_template(&name, &document.result)
                .map_err(quote_err)?;
            println!("Saved template {} ({})", template.name, template.id);
            Ok(())
        }
        TemplateCommand::List => {
            let templates = service.list_templates().map_err(quote_err)?;
            output_templates(output_format, &templates)
        }
    }
}

fn cmd_company(config: &Config, command: CompanyCommand, output_format: OutputFormat) -> Result<()> {
    let repos = Repositories::open(config)?;

    match command {
        CompanyCommand::Show => {
            let company = repos.company.load()?;
            output_company(output_format, company.as_ref())
        }
        CompanyCommand::Set {
            name,
            address,
            phone,
            representative,
            logo,
        } => {
            let mut company = repos.company.load()?.unwrap_or_default();
            if let Some(name) = name {
                company.company_name = name;
            }
            if let Some(address) = address {
                company.address = address;
            }
            if let Some(phone) = phone {
                company.phone = phone;
            }
            if let Some(representative) = representative {
                company.representative = representative;
            }
            if let Some(logo) = logo {
                validate_image(&logo)?;
                let extension = logo
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("png")
                    .to_lowercase();
                let path = format!("company/logo.{}", extension);
                repos.images.upload(&path, &std::fs::read(&logo)?)?;
                company.logo_path = Some(path);
            }
            repos.company.save(&company)?;
            println!("Company information updated");
            output_company(output_format, Some(&company))
        }
    }
}

fn product_references(products: &dyn ProductRepository, ids: &[String]) -> Result<Vec<ProductReference>> {
    ids.iter()
        .map(|id| {
            products
                .find_by_id(id)?
                .map(|product| ProductReference::from(&product))
                .ok_or_else(|| Error::NotFound(format!("product '{}'", id)))
        })
        .collect()
}

/// `<dir>/<stem>_after.<ext>` next to the before photo
fn default_render_path(before: &Path, extension: &str) -> PathBuf {
    let stem = before
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("render");
    before.with_file_name(format!("{}_after.{}", stem, extension))
}

fn cmd_render(
    config: &Config,
    repos: &Repositories,
    before: &Path,
    preset: &str,
    options: &RenderOptions,
    output: Option<PathBuf>,
    save: bool,
) -> Result<()> {
    let backend = config.backend()?;
    let inference = config.inference_config();

    eprintln!("Rendering {} with preset '{}' ...", before.display(), preset);
    let rendered = VisualizationService::new(&repos.images).render(
        &backend, &inference, before, preset, options, save,
    )?;

    let output = output.unwrap_or_else(|| default_render_path(before, rendered.extension));
    std::fs::write(&output, &rendered.bytes)?;
    println!("Saved rendering to: {}", output.display());
    if let Some(ref path) = rendered.blob_path {
        println!("Stored as: {}", path);
    }
    Ok(())
}

fn cmd_chat(config: &Config, kind: AssistantKind, question: Option<String>) -> Result<()> {
    let backend = config.backend()?;
    let inference = config.inference_config();
    let mut assistant = ChatAssistant::new(kind);

    let ask = |assistant: &mut ChatAssistant, question: &str| -> Result<()> {
        let mut stdout = io::stdout();
        assistant.ask(&backend, &inference, question, |chunk| {
            print!("{}", chunk);
            let _ = stdout.flush();
        })?;
        println!();
        Ok(())
    };

    if let Some(question) = question {
        return ask(&mut assistant, &question);
    }

    eprintln!("{} (/clear to reset, /exit to quit)", kind.label());
    let stdin = io::stdin();
    loop {
        eprint!("> ");
        io::stderr().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "" => continue,
            "/exit" | "/quit" => break,
            "/clear" => {
                assistant.clear();
                eprintln!("History cleared");
            }
            question => {
                // A failed turn leaves the history as it was; keep the session open
                if let Err(e) = ask(&mut assistant, question) {
                    eprintln!("\nError: {}", e);
                }
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_config(
    show: bool,
    set_backend_command: Option<String>,
    set_image_model: Option<String>,
    set_chat_model: Option<String>,
    set_store_dir: Option<PathBuf>,
    set_output: Option<OutputFormat>,
    set_temperature: Option<f32>,
    reset: bool,
) -> Result<()> {
    if reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        println!("\n{}", config);
        return Ok(());
    }

    let mut config = Config::load()?;
    let mut modified = false;

    if let Some(command) = set_backend_command {
        config.backend_command = Some(command);
        modified = true;
    }

    if let Some(model) = set_image_model {
        config.image_model = Some(model);
        modified = true;
    }

    if let Some(model) = set_chat_model {
        config.chat_model = Some(model);
        modified = true;
    }

    if let Some(dir) = set_store_dir {
        config.store_dir = Some(dir);
        modified = true;
    }

    if let Some(output_format) = set_output {
        config.output_format = output_format;
        modified = true;
    }

    if let Some(temperature) = set_temperature {
        config.temperature = Some(temperature);
        modified = true;
    }

    if modified {
        config.save()?;
        println!("Configuration updated");
    }

    if show || !modified {
        println!("{}", config);
    }

    Ok(())
}
