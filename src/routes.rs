use crate::{
    api::{attendance, employee, sync},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let submit_limiter = Arc::new(build_limiter(config.rate_submit_per_min));
    let sync_limiter = Arc::new(build_limiter(config.rate_sync_per_min));
    let query_limiter = Arc::new(build_limiter(config.rate_query_per_min));

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/attendance")
                    // /attendance (administrative review)
                    .service(
                        web::resource("")
                            .wrap(query_limiter.clone())
                            .route(web::get().to(attendance::list_attendance)),
                    )
                    // /attendance/submit (the four daily actions)
                    .service(
                        web::resource("/submit")
                            .wrap(submit_limiter.clone())
                            .route(web::post().to(attendance::submit)),
                    )
                    // /attendance/sync (offline queue replay)
                    .service(
                        web::resource("/sync")
                            .wrap(sync_limiter)
                            .route(web::post().to(sync::sync)),
                    )
                    // /attendance/today/{employee_id}
                    .service(
                        web::resource("/today/{employee_id}")
                            .wrap(query_limiter.clone())
                            .route(web::get().to(attendance::today_status)),
                    ),
            )
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .wrap(query_limiter.clone())
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::upsert_employee)),
                    )
                    // /employees/{employee_id}
                    .service(
                        web::resource("/{employee_id}")
                            .wrap(query_limiter)
                            .route(web::get().to(employee::get_employee)),
                    ),
            ),
    );
}
