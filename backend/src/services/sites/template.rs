use crate::pipeline::report::render_template;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, Responder};
use common::model::schema::TEMPLATE_FILENAME;

/// Serves the CSV template as a file download.
pub(crate) async fn process() -> impl Responder {
    match render_template() {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(TEMPLATE_FILENAME.to_string())],
            })
            .body(bytes),
        Err(e) => HttpResponse::InternalServerError().body(format!("Error rendering template: {}", e)),
    }
}
