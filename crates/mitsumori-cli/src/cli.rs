//! CLI definition using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mitsumori_types::{CategoryKind, OutputFormat, RenovationScope};

#[derive(Parser)]
#[command(name = "mitsumori")]
#[command(author = "yuuji")]
#[command(version)]
#[command(about = "Renovation visualization and quotation using AI image generation")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Inference bridge command line (overrides config)
    #[arg(long, global = true)]
    pub backend_command: Option<String>,

    /// Text/chat model override
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Image generation model override
    #[arg(long, global = true)]
    pub image_model: Option<String>,

    /// Store directory override
    #[arg(long, global = true)]
    pub store_dir: Option<PathBuf>,

    /// Output format (json, table). Uses config value if not specified.
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse or format cost strings
    #[command(subcommand)]
    Cost(CostCommand),

    /// Estimate, edit and export quotations
    #[command(subcommand)]
    Quote(QuoteCommand),

    /// Manage the product catalog
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// Manage construction item masters (工事項目マスタ)
    #[command(subcommand)]
    Master(MasterCommand),

    /// Manage quotation templates
    #[command(subcommand)]
    Template(TemplateCommand),

    /// Company information printed on quotations
    #[command(subcommand)]
    Company(CompanyCommand),

    /// Render an "after" image from a before photo
    Render {
        /// Before photo
        before: PathBuf,

        /// Style preset id (see `mitsumori presets`)
        #[arg(long, short = 'p')]
        preset: String,

        /// Wall color (e.g. "オフホワイト")
        #[arg(long)]
        wall_color: Option<String>,

        /// Floor material (e.g. "無垢フローリング")
        #[arg(long)]
        floor: Option<String>,

        /// Catalog product id to include (repeatable)
        #[arg(long = "product")]
        products: Vec<String>,

        /// Free-text request
        #[arg(long)]
        request: Option<String>,

        /// Output image path (default: <before>_after.<ext>)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Also keep the rendering in the store
        #[arg(long)]
        save: bool,
    },

    /// Ask an assistant (interactive when no question is given)
    #[command(subcommand)]
    Chat(ChatCommand),

    /// List style presets
    Presets {
        /// Only presets for this scope
        #[arg(long)]
        scope: Option<RenovationScope>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Set inference bridge command line
        #[arg(long)]
        set_backend_command: Option<String>,

        /// Set image generation model
        #[arg(long)]
        set_image_model: Option<String>,

        /// Set text/chat model
        #[arg(long)]
        set_chat_model: Option<String>,

        /// Set store directory
        #[arg(long)]
        set_store_dir: Option<PathBuf>,

        /// Set default output format
        #[arg(long)]
        set_output: Option<OutputFormat>,

        /// Set sampling temperature
        #[arg(long)]
        set_temperature: Option<f32>,

        /// Reset to defaults
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand)]
pub enum CostCommand {
    /// Parse a cost string into a yen band
    Parse {
        /// Cost text (e.g. "5万円〜8万円")
        text: String,

        /// Item name, used when the cost text has no amount
        #[arg(long)]
        name: Option<String>,
    },

    /// Format yen amounts as man-yen
    Format {
        /// Amount in yen
        min: f64,

        /// Upper bound in yen
        max: Option<f64>,
    },
}

#[derive(Subcommand)]
pub enum QuoteCommand {
    /// Estimate line items from a before/after image pair
    Estimate {
        /// Before photo
        before: PathBuf,

        /// After image (rendering)
        after: PathBuf,

        #[arg(long, default_value = "interior")]
        scope: RenovationScope,

        /// Save as a quotation document with this title
        #[arg(long)]
        save_as: Option<String>,

        /// Customer name for the saved document
        #[arg(long, default_value = "")]
        customer: String,
    },

    /// Show a saved quotation
    Show { id: String },

    /// Edit a saved quotation in one session.
    ///
    /// Order: --set-name, --set-cost, --add, then --remove. Indexes refer to
    /// the item list as shown before the edit. Amounts are in 万円.
    Edit {
        id: String,

        /// INDEX=NAME
        #[arg(long)]
        set_name: Vec<String>,

        /// INDEX=MIN[-MAX]
        #[arg(long)]
        set_cost: Vec<String>,

        /// NAME=MIN[-MAX]
        #[arg(long)]
        add: Vec<String>,

        /// INDEX
        #[arg(long)]
        remove: Vec<usize>,

        /// Replace the notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List saved quotations (newest first)
    List {
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },

    /// Delete a saved quotation and its photos
    Delete { id: String },

    /// Export a quotation to Excel
    Export {
        id: String,

        /// Output Excel file path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Create a quotation from a template
    FromTemplate {
        template_id: String,

        #[arg(long)]
        title: String,

        #[arg(long, default_value = "")]
        customer: String,
    },
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    #[command(subcommand)]
    Category(CategoryCommand),

    #[command(subcommand)]
    Product(ProductCommand),
}

#[derive(Subcommand)]
pub enum CategoryCommand {
    Add {
        name: String,

        #[arg(long, default_value = "other")]
        kind: CategoryKind,
    },

    List,

    /// Delete a category together with its products
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum ProductCommand {
    Add {
        /// Category id
        #[arg(long)]
        category: String,

        name: String,

        #[arg(long, default_value = "")]
        maker: String,

        /// 品番
        #[arg(long, default_value = "")]
        model_number: String,

        /// Unit price in yen
        #[arg(long, default_value = "0")]
        price: u64,

        #[arg(long, default_value = "")]
        unit: String,

        #[arg(long, default_value = "")]
        description: String,
    },

    List {
        /// Only products of this category
        #[arg(long)]
        category: Option<String>,
    },

    /// Delete products (continues past failures)
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Import products from CSV (header: 商品名,メーカー,品番,単価,単位)
    Import {
        csv: PathBuf,

        #[arg(long)]
        category: String,
    },

    /// Upload images named after product model numbers (品番)
    UploadImages { dir: PathBuf },
}

#[derive(Subcommand)]
pub enum MasterCommand {
    /// Import item masters from TOML ([[items]] name, unit, unit_price_min, unit_price_max)
    Import { toml: PathBuf },

    List,
}

#[derive(Subcommand)]
pub enum TemplateCommand {
    /// Save a quotation's items as a template
    Add {
        name: String,

        /// Quotation id to copy items from
        #[arg(long)]
        from_quote: String,
    },

    List,
}

#[derive(Subcommand)]
pub enum CompanyCommand {
    Show,

    Set {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        representative: Option<String>,

        /// Logo image
        #[arg(long)]
        logo: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum ChatCommand {
    /// Usage help (使い方サポート)
    Support { question: Option<String> },

    /// Sales coaching (営業コーチ)
    Sales { question: Option<String> },
}
