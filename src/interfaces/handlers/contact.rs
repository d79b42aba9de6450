use actix_web::{post, web, HttpResponse, Responder};

use crate::{
    entities::contact::{ContactRequest, ContactResponse},
    middlewares::abuse_shield::AbuseShield,
    AppState,
};

#[post("/contact", wrap = "AbuseShield")]
pub async fn submit_contact(
    state: web::Data<AppState>,
    form: web::Json<ContactRequest>,
) -> impl Responder {
    match state.contact_handler.submit(form.into_inner()).await {
        Ok(outcome) => HttpResponse::Ok().json(ContactResponse::from(outcome)),
        Err(e) => e.to_http_response(),
    }
}
