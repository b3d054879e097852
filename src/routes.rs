use crate::{
    api::{offer_letter, salary, user},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

/// Per-IP limiter allowing `requests_per_min` with an equal burst.
fn build_limiter(requests_per_min: u32) -> anyhow::Result<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let requests_per_min = requests_per_min.max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request((60_000 / requests_per_min as u64).max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit: {requests_per_min} per minute"))?;
    Ok(Governor::new(&cfg))
}

/// Built once at start-up and shared by every worker, so each IP has one
/// bucket per route group.
#[derive(Clone)]
pub struct Limiters {
    login: Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>,
    protected: Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>,
}

impl Limiters {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            login: Arc::new(build_limiter(config.rate_login_per_min)?),
            protected: Arc::new(build_limiter(config.rate_protected_per_min)?),
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    // Public routes
    cfg.service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(limiters.login.clone())
                .route(web::post().to(handlers::login)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiters.protected.clone()) // rate limiting
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::register))
                    .route("/change-password", web::put().to(handlers::change_password)),
            )
            .service(
                web::scope("/users")
                    // /users
                    .service(web::resource("").route(web::get().to(user::list_users)))
                    // /users/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(user::get_user))
                            .route(web::put().to(user::update_user))
                            .route(web::delete().to(user::delete_user)),
                    ),
            )
            .service(
                web::scope("/salary")
                    .route("/all", web::get().to(salary::list_all_slips))
                    // /salary/user/{user_id}
                    .service(
                        web::resource("/user/{user_id}")
                            .route(web::post().to(salary::create_slip))
                            .route(web::get().to(salary::list_user_slips)),
                    )
                    .route("/user/{user_id}/recent", web::get().to(salary::latest_user_slip))
                    .route("/user/{user_id}/period", web::get().to(salary::user_slip_for_period))
                    // /salary/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(salary::get_slip))
                            .route(web::put().to(salary::update_slip))
                            .route(web::delete().to(salary::delete_slip)),
                    )
                    .route("/{id}/download", web::get().to(salary::download_slip)),
            )
            .service(
                web::scope("/offer-letters")
                    // /offer-letters
                    .service(
                        web::resource("")
                            .route(web::post().to(offer_letter::create_offer_letter))
                            .route(web::get().to(offer_letter::list_offer_letters)),
                    )
                    .route("/user/{user_id}", web::get().to(offer_letter::user_offer_letter))
                    // /offer-letters/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(offer_letter::get_offer_letter))
                            .route(web::put().to(offer_letter::update_offer_letter))
                            .route(web::delete().to(offer_letter::delete_offer_letter)),
                    )
                    .route("/{id}/download", web::get().to(offer_letter::download_offer_letter)),
            ),
    );
}
