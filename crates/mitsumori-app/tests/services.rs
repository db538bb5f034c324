//! Service-level tests against a temporary store and a scripted backend

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use mitsumori_app::app::{
    CatalogService, CatalogServiceError, ChatAssistant, EditOp, QuotationService,
    QuotationServiceError, VisualizationService,
};
use mitsumori_app::repository::Repositories;
use mitsumori_domain::repository::{ImageRepository, ProductRepository, QuotationTemplateRepository};
use mitsumori_types::{
    CategoryKind, Error, InferenceError, LineItem, Product, QuotationTemplate, RenovationScope,
    Result,
};
use mitsumori_vision::{
    AssistantKind, ChatRequest, ChatStream, GenerateContentRequest, GenerateContentResponse,
    InferenceBackend, InferenceConfig, RenderOptions,
};
use tempfile::TempDir;

/// Returns queued responses in order; chat answers with fixed fragments
#[derive(Default)]
struct ScriptedBackend {
    responses: RefCell<VecDeque<serde_json::Value>>,
    chat_fragments: Vec<Result<String>>,
}

impl ScriptedBackend {
    fn with_response(response: serde_json::Value) -> Self {
        let backend = Self::default();
        backend.responses.borrow_mut().push_back(response);
        backend
    }
}

impl InferenceBackend for ScriptedBackend {
    fn generate(&self, _request: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let response = self
            .responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| InferenceError::Command("no scripted response".to_string()))?;
        Ok(serde_json::from_value(response)?)
    }

    fn chat_stream(&self, _request: &ChatRequest) -> Result<ChatStream> {
        let fragments: Vec<Result<String>> = self
            .chat_fragments
            .iter()
            .map(|f| match f {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(InferenceError::Stream("connection reset".to_string()).into()),
            })
            .collect();
        Ok(Box::new(fragments.into_iter()))
    }
}

fn text_response(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": text}]}, "finishReason": "STOP"}]
    })
}

fn write_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::new(4, 4).save(&path).unwrap();
    path
}

fn setup() -> (TempDir, Repositories) {
    let dir = TempDir::new().unwrap();
    let repos = Repositories::open_at(dir.path().join("store")).unwrap();
    (dir, repos)
}

fn catalog(repos: &Repositories) -> CatalogService<'_> {
    CatalogService::new(&repos.categories, &repos.products, &repos.images)
}

fn quotations(repos: &Repositories) -> QuotationService<'_> {
    QuotationService::new(&repos.quotations, &repos.templates, &repos.item_masters, &repos.images)
}

#[test]
fn test_delete_category_cascades_to_products_and_images() {
    let (_dir, repos) = setup();
    let service = catalog(&repos);
    let category = service.add_category("壁紙", CategoryKind::Wallpaper).unwrap();

    let mut with_image = Product::new(&category.id, "量産クロス");
    with_image.image_path = Some("products/cross.png".to_string());
    repos.images.upload("products/cross.png", b"png").unwrap();
    service.add_product(with_image).unwrap();
    service.add_product(Product::new(&category.id, "アクセントクロス")).unwrap();

    let deleted = service.delete_category(&category.id).unwrap();

    assert_eq!(deleted, 2);
    assert!(service.list_categories().unwrap().is_empty());
    assert!(service.list_products(None).unwrap().is_empty());
    assert!(repos.images.download("products/cross.png").is_err());
}

/// Product repository whose deletes fail for one id
struct FailingDeletes<'a> {
    inner: &'a dyn ProductRepository,
    fail_id: String,
}

impl ProductRepository for FailingDeletes<'_> {
    fn save(&self, product: &Product) -> Result<()> {
        self.inner.save(product)
    }

    fn find_by_id(&self, id: &str) -> Result<Option<Product>> {
        self.inner.find_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<Product>> {
        self.inner.find_all()
    }

    fn find_by_category(&self, category_id: &str) -> Result<Vec<Product>> {
        self.inner.find_by_category(category_id)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        if id == self.fail_id {
            return Err(Error::NotFound(format!("locked product {}", id)));
        }
        self.inner.delete(id)
    }
}

#[test]
fn test_failed_member_delete_keeps_category() {
    let (_dir, repos) = setup();
    let category = catalog(&repos).add_category("家具", CategoryKind::Furniture).unwrap();
    let locked = Product::new(&category.id, "ソファ");
    repos.products.save(&locked).unwrap();

    let failing = FailingDeletes {
        inner: &repos.products,
        fail_id: locked.id.clone(),
    };
    let service = CatalogService::new(&repos.categories, &failing, &repos.images);

    let err = service.delete_category(&category.id).unwrap_err();
    assert!(matches!(err, CatalogServiceError::CascadeAborted { .. }));
    assert_eq!(service.list_categories().unwrap().len(), 1);
}

#[test]
fn test_bulk_image_upload_is_best_effort() {
    let (dir, repos) = setup();
    let service = catalog(&repos);
    let category = service.add_category("塗料", CategoryKind::Paint).unwrap();
    let mut paint = Product::new(&category.id, "水性シリコン");
    paint.model_number = "NP-100".to_string();
    let paint = service.add_product(paint).unwrap();
    let mut broken = Product::new(&category.id, "油性塗料");
    broken.model_number = "BROKEN".to_string();
    service.add_product(broken).unwrap();

    let images = dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    write_png(&images, "np-100.png");
    write_png(&images, "unknown.png");
    std::fs::write(images.join("BROKEN.jpg"), b"not a jpeg").unwrap();

    let mut progress = Vec::new();
    let report = service
        .upload_product_images(&images, |done, total| progress.push((done, total)))
        .unwrap();

    assert_eq!(report.succeeded.len(), 1);
    assert_eq!(report.failed.len(), 2);
    assert_eq!(progress.last(), Some(&(3, 3)));

    let stored = repos.products.find_by_id(&paint.id).unwrap().unwrap();
    let image_path = stored.image_path.unwrap();
    assert_eq!(image_path, format!("products/{}.png", paint.id));
    assert!(repos.images.download(&image_path).is_ok());
}

#[test]
fn test_import_products_csv() {
    let (dir, repos) = setup();
    let service = catalog(&repos);
    let category = service.add_category("壁紙", CategoryKind::Wallpaper).unwrap();
    let csv_path = dir.path().join("products.csv");
    std::fs::write(
        &csv_path,
        "商品名,メーカー,品番,単価,単位\n量産クロス,サンゲツ,SP-2801,1200,㎡\n織物クロス,リリカラ,LL-5000,2400,㎡\n",
    )
    .unwrap();

    let imported = service.import_products_csv(&csv_path, &category.id).unwrap();
    assert_eq!(imported.len(), 2);
    assert_eq!(service.list_products(Some(&category.id)).unwrap().len(), 2);

    let err = service.import_products_csv(&csv_path, "missing").unwrap_err();
    assert!(matches!(err, CatalogServiceError::CategoryNotFound(_)));
}

#[test]
fn test_estimate_save_edit_and_delete_document() {
    let (dir, repos) = setup();
    let before = write_png(dir.path(), "before.png");
    let after = write_png(dir.path(), "after.png");
    let backend = ScriptedBackend::with_response(text_response(
        r#"```json
{"items":[{"name":"クロス張替え","cost_range":"5万円〜8万円"},{"name":"照明交換","cost_range":"3万円"}],"total_cost_range":"8万円〜11万円","notes":"概算です"}
```"#,
    ));
    let service = quotations(&repos);

    let result = service
        .estimate(&backend, &InferenceConfig::default(), &before, &after, RenovationScope::Interior)
        .unwrap();
    assert_eq!(result.items.len(), 2);

    let document = service
        .create_document("リビング", "山田様", result, Some(&before), Some(&after))
        .unwrap();
    let before_blob = document.before_image.clone().unwrap();
    assert!(repos.images.download(&before_blob).is_ok());

    let edited = service
        .edit_document(
            &document.id,
            &[EditOp::SetName {
                index: 1,
                name: "ダウンライト交換".to_string(),
            }],
            Some("税込"),
        )
        .unwrap();
    assert_eq!(edited.result.items[1].name, "ダウンライト交換");
    assert_eq!(edited.result.total_cost_range, "8万円〜11万円");
    assert_eq!(edited.result.notes, "税込");
    assert!(edited.updated_at >= document.updated_at);

    service.delete_document(&document.id).unwrap();
    assert!(service.list_documents().unwrap().is_empty());
    assert!(repos.images.download(&before_blob).is_err());
    assert!(matches!(
        service.get_document(&document.id),
        Err(QuotationServiceError::DocumentNotFound(_))
    ));
}

#[test]
fn test_estimate_rejects_truncated_answer() {
    let (dir, repos) = setup();
    let before = write_png(dir.path(), "before.png");
    let backend = ScriptedBackend::with_response(serde_json::json!({
        "candidates": [{"content": {"parts": [{"text": "{\"items\": ["}]}, "finishReason": "MAX_TOKENS"}]
    }));

    let err = quotations(&repos)
        .estimate(&backend, &InferenceConfig::default(), &before, &before, RenovationScope::Exterior)
        .unwrap_err();
    assert!(matches!(err, QuotationServiceError::EstimationFailed(_)));
}

#[test]
fn test_apply_template_computes_total() {
    let (_dir, repos) = setup();
    let mut template = QuotationTemplate::new(
        "外壁 標準",
        vec![
            LineItem::new("足場設置", "15万円〜20万円"),
            LineItem::new("外壁塗装", "80万円〜100万円"),
        ],
    );
    template.notes = "30坪想定".to_string();
    repos.templates.save(&template).unwrap();

    let result = quotations(&repos).apply_template(&template.id).unwrap();
    assert_eq!(result.total_cost_range, "95万円〜120万円");
    assert_eq!(result.notes, "30坪想定");

    assert!(matches!(
        quotations(&repos).apply_template("nope"),
        Err(QuotationServiceError::TemplateNotFound(_))
    ));
}

#[test]
fn test_import_item_masters_replaces_by_name() {
    let (dir, repos) = setup();
    let path = dir.path().join("items.toml");
    std::fs::write(
        &path,
        "[[items]]\nname = \"クロス張替え\"\nunit = \"㎡\"\nunit_price_min = 1000\nunit_price_max = 1500\n",
    )
    .unwrap();
    let service = quotations(&repos);

    assert_eq!(service.import_item_masters(&path).unwrap(), (1, 0));
    assert_eq!(service.import_item_masters(&path).unwrap(), (1, 1));
    assert_eq!(service.list_item_masters().unwrap().len(), 1);
}

#[test]
fn test_render_saves_to_renders() {
    let (dir, repos) = setup();
    let before = write_png(dir.path(), "room.png");
    let backend = ScriptedBackend::with_response(serde_json::json!({
        "candidates": [{
            "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "cmVuZGVy"}}]},
            "finishReason": "STOP"
        }]
    }));
    let service = VisualizationService::new(&repos.images);

    let rendered = service
        .render(&backend, &InferenceConfig::default(), &before, "scandinavian", &RenderOptions::default(), true)
        .unwrap();

    assert_eq!(rendered.bytes, b"render");
    let blob_path = rendered.blob_path.unwrap();
    assert!(blob_path.starts_with("renders/") && blob_path.ends_with(".png"));
    assert_eq!(repos.images.download(&blob_path).unwrap(), b"render");
}

#[test]
fn test_render_unknown_preset() {
    let (dir, repos) = setup();
    let before = write_png(dir.path(), "room.png");
    let err = VisualizationService::new(&repos.images)
        .render(&ScriptedBackend::default(), &InferenceConfig::default(), &before, "baroque", &RenderOptions::default(), false)
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_chat_keeps_history_only_on_success() {
    let mut backend = ScriptedBackend {
        chat_fragments: vec![Ok("写真を".to_string()), Ok("アップロードしてください".to_string())],
        ..Default::default()
    };
    let config = InferenceConfig::default();
    let mut assistant = ChatAssistant::new(AssistantKind::Help);

    let mut streamed = String::new();
    let answer = assistant
        .ask(&backend, &config, "使い方は？", |chunk| streamed.push_str(chunk))
        .unwrap();
    assert_eq!(answer, "写真をアップロードしてください");
    assert_eq!(streamed, answer);
    assert_eq!(assistant.history().len(), 2);

    backend.chat_fragments = vec![Ok("途中".to_string()), Err(Error::NotFound(String::new()))];
    assert!(assistant.ask(&backend, &config, "続きは？", |_| {}).is_err());
    assert_eq!(assistant.history().len(), 2);
}
