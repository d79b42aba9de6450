use actix_web::web;

use crate::handlers::{
    contact::submit_contact,
    system::{health_check, home, ping},
};

mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home)
        .service(ping)
        .service(health_check)
        .service(submit_contact);

    cfg.configure(json_error::config_routes);
}
