use crate::{
    api::{attendance, salary, worker},
    error::bad_input,
    store::RecordStore,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    web,
};
use anyhow::Context;
use std::sync::Arc;

pub type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-IP limiter allowing `requests_per_min` requests a minute.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .context("invalid rate limiter settings")?;
    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure<S: RecordStore>(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: Limiter) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(limiter) // rate limiting
            .configure(api::<S>),
    );
}

pub fn api<S: RecordStore>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(bad_input::<JsonPayloadError>))
        .app_data(web::QueryConfig::default().error_handler(bad_input::<QueryPayloadError>))
        .app_data(web::PathConfig::default().error_handler(bad_input::<PathError>));

    cfg.service(
        web::scope("/workers")
            // /workers
            .service(
                web::resource("")
                    .route(web::post().to(worker::create_worker::<S>))
                    .route(web::get().to(worker::list_workers::<S>)),
            )
            // /workers/{worker_id}
            .service(
                web::resource("/{worker_id}")
                    .route(web::get().to(worker::get_worker::<S>))
                    .route(web::delete().to(worker::delete_worker::<S>)),
            ),
    )
    .service(
        web::scope("/attendance")
            // /attendance
            .service(
                web::resource("")
                    .route(web::get().to(attendance::list_attendance::<S>))
                    .route(web::post().to(attendance::record_attendance::<S>)),
            )
            // /attendance/total/{worker_id}
            .service(
                web::resource("/total/{worker_id}")
                    .route(web::get().to(attendance::total_days_present::<S>)),
            )
            .service(
                web::resource("/history").route(web::get().to(attendance::attendance_history::<S>)),
            )
            .service(
                web::resource("/archive").route(web::post().to(attendance::archive_attendance::<S>)),
            ),
    )
    .service(
        web::scope("/salary")
            // /salary
            .service(
                web::resource("")
                    .route(web::get().to(salary::list_salaries::<S>))
                    .route(web::post().to(salary::record_salary::<S>)),
            )
            .service(web::resource("/overview").route(web::get().to(salary::salary_overview::<S>)))
            // /salary/compute?worker_id=..&daily_rate=..
            .service(web::resource("/compute").route(web::get().to(salary::compute_salary::<S>)))
            .service(web::resource("/history").route(web::get().to(salary::salary_history::<S>)))
            .service(web::resource("/archive").route(web::post().to(salary::archive_salary::<S>))),
    );
}
