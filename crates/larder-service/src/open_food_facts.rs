//! OpenFoodFacts product lookup.

use async_trait::async_trait;
use larder_config::OpenFoodFactsConfig;
use larder_core::{Interface, LarderError, LarderResult, NewFood};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};
use utoipa::ToSchema;

const SERVICE_NAME: &str = "openfoodfacts";

/// Per-100g nutrition facts as published by OpenFoodFacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductNutriments {
    pub calories: Option<f64>,
    pub proteins: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub fats: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub salt: Option<f64>,
}

/// A product found on OpenFoodFacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenFoodFactsProduct {
    pub barcode: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    /// Comma-separated category list.
    pub categories: Option<String>,
    pub image_url: Option<String>,
    pub nutriscore_grade: Option<String>,
    pub nutriments: ProductNutriments,
}

impl OpenFoodFactsProduct {
    /// The most general category (the first one listed).
    #[must_use]
    pub fn primary_category(&self) -> Option<String> {
        self.categories
            .as_deref()
            .and_then(|c| c.split(',').map(str::trim).find(|c| !c.is_empty()))
            .map(ToString::to_string)
    }

    /// Catalog fields for importing this product as a local food.
    #[must_use]
    pub fn to_new_food(&self) -> NewFood {
        NewFood {
            name: self.name.clone().unwrap_or_else(|| self.barcode.clone()),
            brand: self.brand.clone(),
            barcode: Some(self.barcode.clone()),
            category: self.primary_category(),
            unit: None,
            calories: self.nutriments.calories,
            proteins: self.nutriments.proteins,
            carbohydrates: self.nutriments.carbohydrates,
            fats: self.nutriments.fats,
            fiber: self.nutriments.fiber,
            sugar: self.nutriments.sugar,
            salt: self.nutriments.salt,
            image_url: self.image_url.clone(),
        }
    }
}

/// Product lookup against OpenFoodFacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OpenFoodFactsClient: Interface + Send + Sync {
    /// Returns `None` when OpenFoodFacts has no product for the barcode.
    async fn find_product(&self, barcode: &str) -> LarderResult<Option<OpenFoodFactsProduct>>;
}

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    #[serde(default)]
    status: i64,
    product: Option<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    product_name: Option<String>,
    brands: Option<String>,
    categories: Option<String>,
    image_url: Option<String>,
    nutriscore_grade: Option<String>,
    #[serde(default)]
    nutriments: RawNutriments,
}

#[derive(Debug, Default, Deserialize)]
struct RawNutriments {
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_f64")]
    energy_kcal: Option<f64>,
    #[serde(rename = "proteins_100g", default, deserialize_with = "lenient_f64")]
    proteins: Option<f64>,
    #[serde(rename = "carbohydrates_100g", default, deserialize_with = "lenient_f64")]
    carbohydrates: Option<f64>,
    #[serde(rename = "fat_100g", default, deserialize_with = "lenient_f64")]
    fat: Option<f64>,
    #[serde(rename = "fiber_100g", default, deserialize_with = "lenient_f64")]
    fiber: Option<f64>,
    #[serde(rename = "sugars_100g", default, deserialize_with = "lenient_f64")]
    sugars: Option<f64>,
    #[serde(rename = "salt_100g", default, deserialize_with = "lenient_f64")]
    salt: Option<f64>,
}

/// Nutriment values arrive as numbers or numeric strings.
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RawProduct {
    fn into_product(self, barcode: &str) -> OpenFoodFactsProduct {
        OpenFoodFactsProduct {
            barcode: barcode.to_string(),
            name: non_empty(self.product_name),
            brand: non_empty(self.brands),
            categories: non_empty(self.categories),
            image_url: non_empty(self.image_url),
            nutriscore_grade: non_empty(self.nutriscore_grade),
            nutriments: ProductNutriments {
                calories: self.nutriments.energy_kcal,
                proteins: self.nutriments.proteins,
                carbohydrates: self.nutriments.carbohydrates,
                fats: self.nutriments.fat,
                fiber: self.nutriments.fiber,
                sugar: self.nutriments.sugars,
                salt: self.nutriments.salt,
            },
        }
    }
}

/// `reqwest` client for the OpenFoodFacts v2 product API.
#[derive(Debug, Clone)]
pub struct HttpOpenFoodFactsClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpOpenFoodFactsClient {
    pub fn new(config: &OpenFoodFactsConfig) -> LarderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| LarderError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn product_url(&self, barcode: &str) -> String {
        format!("{}/api/v2/product/{barcode}.json", self.base_url)
    }
}

#[async_trait]
impl OpenFoodFactsClient for HttpOpenFoodFactsClient {
    async fn find_product(&self, barcode: &str) -> LarderResult<Option<OpenFoodFactsProduct>> {
        let url = self.product_url(barcode);
        debug!(%url, "querying OpenFoodFacts");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LarderError::external(SERVICE_NAME, e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            warn!(barcode, status = %response.status(), "OpenFoodFacts returned an error");
            return Err(LarderError::external(
                SERVICE_NAME,
                format!("unexpected status {}", response.status()),
            ));
        }

        let envelope: ProductEnvelope = response
            .json()
            .await
            .map_err(|e| LarderError::external(SERVICE_NAME, format!("invalid response: {e}")))?;

        match (envelope.status, envelope.product) {
            (1, Some(product)) => Ok(Some(product.into_product(barcode))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpOpenFoodFactsClient {
        HttpOpenFoodFactsClient::new(&OpenFoodFactsConfig {
            base_url: server.uri(),
            timeout_secs: 2,
            user_agent: "larder-test".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_found_product_is_mapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v2/product/3017620422003.json"))
            .and(header("user-agent", "larder-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "3017620422003",
                "status": 1,
                "product": {
                    "product_name": "Nutella",
                    "brands": "Ferrero",
                    "categories": "Spreads, Sweet spreads, Hazelnut spreads",
                    "image_url": "https://images.example/nutella.jpg",
                    "nutriscore_grade": "e",
                    "nutriments": {
                        "energy-kcal_100g": 539,
                        "proteins_100g": 6.3,
                        "carbohydrates_100g": "57.5",
                        "fat_100g": 30.9,
                        "sugars_100g": 56.3,
                        "salt_100g": 0.107
                    }
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let product = client_for(&server)
            .find_product("3017620422003")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(product.name.as_deref(), Some("Nutella"));
        assert_eq!(product.brand.as_deref(), Some("Ferrero"));
        assert_eq!(product.primary_category().as_deref(), Some("Spreads"));
        assert_eq!(product.nutriments.calories, Some(539.0));
        assert_eq!(product.nutriments.carbohydrates, Some(57.5));
        assert_eq!(product.nutriments.fiber, None);

        let food = product.to_new_food();
        assert_eq!(food.barcode.as_deref(), Some("3017620422003"));
        assert_eq!(food.fats, Some(30.9));
        assert_eq!(food.sugar, Some(56.3));
    }

    #[tokio::test]
    async fn test_status_zero_means_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "0000000000000",
                "status": 0,
                "status_verbose": "product not found"
            })))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).find_product("0000000000000").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_http_404_means_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"status": 0})))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).find_product("12345678").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_server_error_is_external_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).find_product("12345678").await.unwrap_err();
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_malformed_body_is_external_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).find_product("12345678").await.unwrap_err();
        assert!(matches!(err, LarderError::ExternalService { .. }));
    }

    #[test]
    fn test_product_without_name_falls_back_to_barcode() {
        let product = OpenFoodFactsProduct {
            barcode: "12345678".to_string(),
            name: None,
            brand: None,
            categories: Some(" , Dairies".to_string()),
            image_url: None,
            nutriscore_grade: None,
            nutriments: ProductNutriments::default(),
        };

        let food = product.to_new_food();
        assert_eq!(food.name, "12345678");
        assert_eq!(food.category.as_deref(), Some("Dairies"));
    }
}
