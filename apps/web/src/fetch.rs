use prayer_core::{Transport, TransportError};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

/// Browser `fetch` as the core's transport. All three APIs allow CORS.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

fn failed(err: &JsValue) -> TransportError {
    TransportError::Failed(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl FetchTransport {
    async fn send(&self, url: &str, body: Option<&Value>) -> Result<Value, TransportError> {
        let window = web_sys::window()
            .ok_or_else(|| TransportError::Failed("no window".to_string()))?;

        let opts = RequestInit::new();
        opts.set_mode(RequestMode::Cors);
        match body {
            Some(body) => {
                opts.set_method("POST");
                opts.set_body(&JsValue::from_str(&body.to_string()));
            }
            None => opts.set_method("GET"),
        }

        let request = Request::new_with_str_and_init(url, &opts).map_err(|e| failed(&e))?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(|e| failed(&e))?;
        }

        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| failed(&e))?
            .dyn_into::<Response>()
            .map_err(|e| failed(&e))?;

        if !response.ok() {
            return Err(TransportError::Status {
                code: response.status(),
                message: response.status_text(),
            });
        }

        let text = JsFuture::from(response.text().map_err(|e| failed(&e))?)
            .await
            .map_err(|e| failed(&e))?
            .as_string()
            .unwrap_or_default();
        serde_json::from_str(&text).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

impl Transport for FetchTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TransportError> {
        self.send(url, None).await
    }

    async fn post_json(&self, url: &str, body: &Value) -> Result<Value, TransportError> {
        self.send(url, Some(body)).await
    }
}
