use std::net::SocketAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing::post};
use base64::Engine;
use image::ImageEncoder;
use image::codecs::png::PngEncoder;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use terragen::biome::Biome;
use terragen::config::Params;
use terragen::output::WorldgenOutput;
use terragen::render;
use terragen::worker::{Generated, WorkerError, Worldgen};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    generation: u64,
    output: WorldgenOutput,
    layers: Vec<Layer>,
    legend: Vec<LegendEntry>,
    timings: Vec<TimingEntry>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Layer {
    name: String,
    data_url: String,
}

#[derive(Serialize)]
struct LegendEntry {
    biome: &'static str,
    color: u32,
}

#[derive(Serialize)]
struct TimingEntry {
    name: String,
    ms: f64,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorBody { error: self.1 })).into_response()
    }
}

impl From<WorkerError> for ApiError {
    fn from(e: WorkerError) -> Self {
        let status = match e {
            WorkerError::Failed(terragen::error::WorldgenError::InvalidParam { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            WorkerError::Stale { .. } => StatusCode::CONFLICT,
            WorkerError::Failed(_) | WorkerError::Disconnected => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

fn encode_png(rgba: &[u8], w: usize, h: usize) -> Result<String, image::ImageError> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf).write_image(rgba, w as u32, h as u32, image::ExtendedColorType::Rgba8)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/png;base64,{}", b64))
}

fn build_response(done: Generated) -> Result<GenerateResponse, image::ImageError> {
    let world = &done.world;
    let layers = render::render_layers(world)
        .into_iter()
        .map(|(name, rgba)| {
            Ok(Layer {
                name: name.to_string(),
                data_url: encode_png(&rgba, world.w, world.h)?,
            })
        })
        .collect::<Result<Vec<_>, image::ImageError>>()?;

    let legend = Biome::ALL
        .iter()
        .map(|&b| LegendEntry {
            biome: b.title(),
            color: render::biome_label_color(b),
        })
        .collect();

    let timings = done
        .timings
        .iter()
        .map(|t| TimingEntry {
            name: t.name.to_string(),
            ms: t.ms,
        })
        .collect();

    Ok(GenerateResponse {
        generation: done.generation,
        output: WorldgenOutput::from_world(world),
        layers,
        legend,
        timings,
    })
}

async fn generate_handler(
    State(worker): State<Worldgen>,
    Json(params): Json<Params>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let done = worker.request(params).recv().await?;
    log::info!("generation {} done", done.generation);

    let response = tokio::task::spawn_blocking(move || build_response(done))
        .await
        .map_err(|e| ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(response))
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let frontend = ServeDir::new("frontend");

    let app = Router::new()
        .route("/api/generate", post(generate_handler))
        .fallback_service(frontend)
        .layer(CorsLayer::permissive())
        .with_state(Worldgen::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    log::info!("terragen server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
