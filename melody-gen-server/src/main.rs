mod model;

use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware, put, web};

use serde::{Deserialize, Serialize};

use melody_gen_core::error::MelodyError;
use melody_gen_core::io::list_files;
use melody_gen_core::model::decoder::{NoteEvent, decode};
use melody_gen_core::model::generation_input::GenerationInput;
use melody_gen_core::model::generator::MelodyGenerator;
use melody_gen_core::model::vocabulary::Vocabulary;

use crate::model::TransitionModel;

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	seed: Option<String>,
	num_steps: Option<usize>,
	max_window: Option<usize>,
	temperature: Option<f32>,
	step_duration: Option<f64>,
}

#[derive(Serialize)]
struct GenerateResponse {
	melody: String,
	events: Vec<NoteEvent>,
}

#[derive(Deserialize)]
struct ModelQuery {
	name: Option<String>,
}

struct SharedData {
	vocabulary: Arc<Vocabulary>,
	session: Option<MelodyGenerator<TransitionModel>>,
	model_name: Option<String>,
}

/// Maps pipeline errors to HTTP responses.
///
/// Seed and parameter precondition violations are the caller's fault,
/// including an empty decode (the caller retries with a different seed or
/// more steps); everything else is a model/vocabulary fault of the running
/// session.
fn error_response(error: MelodyError) -> HttpResponse {
	match error {
		MelodyError::UnknownSymbol(_)
		| MelodyError::EmptyMelody
		| MelodyError::InvalidTemperature(_)
		| MelodyError::InvalidStepDuration(_)
		| MelodyError::InvalidWindow(_) => HttpResponse::BadRequest().body(error.to_string()),
		_ => HttpResponse::InternalServerError().body(error.to_string()),
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a melody from the query seed and returns it with its decoded
/// timed events. Defaults match the original front-end: 200 steps, a
/// 64-token window, temperature 0.4, a 0.25 base step.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let mut input = GenerationInput::new(query.seed.clone().unwrap_or_default());
	input.num_steps = query.num_steps.unwrap_or(200);
	input.max_window = query.max_window.unwrap_or(64);
	if let Err(e) = input.set_temperature(query.temperature.unwrap_or(0.4)) {
		return error_response(e);
	}
	let step_duration = query.step_duration.unwrap_or(0.25);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Session lock failed"),
	};

	let session = match &shared_data.session {
		Some(session) => session,
		None => return HttpResponse::InternalServerError().body("No model loaded"),
	};

	let melody = match session.generate(&input) {
		Ok(melody) => melody,
		Err(e) => return error_response(e),
	};

	match decode(melody.symbols(), step_duration) {
		Ok(events) => HttpResponse::Ok().json(GenerateResponse {
			melody: melody.to_string(),
			events,
		}),
		Err(e) => error_response(e),
	}
}

#[get("/v1/models")]
async fn get_models() -> impl Responder {
	match list_files(&"./data".to_owned(), "dat") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".dat", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list models"),
	}
}

#[get("/v1/loaded_model")]
async fn get_loaded_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Session lock failed"),
	};
	match &shared_data.model_name {
		Some(name) => HttpResponse::Ok().body(name.clone()),
		None => HttpResponse::NotFound().body("No model loaded"),
	}
}

/// HTTP PUT endpoint `/v1/load_model`
///
/// Loads a `.dat` model from `./data` and opens a fresh generation session
/// around it. A model whose width does not match the vocabulary is an
/// unusable pairing and is rejected without being installed.
#[put("/v1/load_model")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Session lock failed"),
	};

	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim().to_owned(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};

	let model_path = format!("./data/{}.dat", name);
	let transition_model = match TransitionModel::new(&model_path) {
		Ok(m) => m,
		Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}")),
	};

	if transition_model.vocabulary_size() != shared_data.vocabulary.len() {
		let error = MelodyError::ConfigurationMismatch {
			model: transition_model.vocabulary_size(),
			vocabulary: shared_data.vocabulary.len(),
		};
		return HttpResponse::InternalServerError().body(error.to_string());
	}

	log::info!("loaded model '{}' from {}", name, model_path);
	shared_data.session = Some(MelodyGenerator::new(
		transition_model,
		shared_data.vocabulary.clone(),
	));
	shared_data.model_name = Some(name);

	HttpResponse::Ok().body("Model loaded successfully")
}

/// Main entry point for the server.
///
/// Loads the symbol table once, wraps the session state in a `Mutex` for
/// thread safety, and starts an Actix-web HTTP server.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - The symbol table path is hardcoded to ./data/mapping.json and should
///   be made configurable.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let vocabulary = Vocabulary::from_file("./data/mapping.json")
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
	log::info!("symbol table loaded, {} symbols", vocabulary.len());

	let shared_data = SharedData {
		vocabulary: Arc::new(vocabulary),
		session: None,
		model_name: None,
	};
	let shared_session = web::Data::new(Mutex::new(shared_data));

	HttpServer::new(move || {
		App::new()
			.app_data(shared_session.clone())
			.wrap(Cors::permissive())
			.wrap(middleware::Logger::default())
			.service(get_generated)
			.service(get_models)
			.service(get_loaded_model)
			.service(put_model)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use actix_web::http::StatusCode;

	use super::*;

	#[test]
	fn caller_recoverable_errors_are_bad_requests() {
		let errors = [
			MelodyError::UnknownSymbol("61".to_owned()),
			MelodyError::EmptyMelody,
			MelodyError::InvalidTemperature(0.0),
			MelodyError::InvalidStepDuration(-0.25),
			MelodyError::InvalidWindow(0),
		];
		for error in errors {
			assert_eq!(error_response(error).status(), StatusCode::BAD_REQUEST);
		}
	}

	#[test]
	fn session_faults_are_server_errors() {
		let errors = [
			MelodyError::ConfigurationMismatch { model: 4, vocabulary: 5 },
			MelodyError::UnknownToken { token: 9, vocabulary: 5 },
			MelodyError::NumericInstability("all probabilities are zero".to_owned()),
		];
		for error in errors {
			assert_eq!(error_response(error).status(), StatusCode::INTERNAL_SERVER_ERROR);
		}
	}
}
