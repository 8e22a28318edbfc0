/// HTTP server answering dashboard queries over a loaded order table
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::dashboard::Dashboard;
use crate::messages::{BoundsResponse, DashboardQuery, ErrorResponse};
use crate::table::OrderTable;

/// State shared by all workers. The table is never mutated after load, so
/// every request reads it without locking and builds its own dashboard.
pub struct AppState {
    pub table: Arc<OrderTable>,
    pub leaderboard_size: usize,
}

impl AppState {
    pub fn new(table: OrderTable, leaderboard_size: usize) -> Self {
        Self {
            table: Arc::new(table),
            leaderboard_size,
        }
    }
}

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "MartDash server is running"
    }))
}

async fn bounds(state: web::Data<AppState>) -> HttpResponse {
    let bounds = state.table.purchase_date_bounds();
    HttpResponse::Ok().json(BoundsResponse {
        min_date: bounds.map(|(min, _)| min),
        max_date: bounds.map(|(_, max)| max),
        rows: state.table.len(),
    })
}

async fn dashboard(state: web::Data<AppState>, query: web::Query<DashboardQuery>) -> HttpResponse {
    let Some(bounds) = state.table.purchase_date_bounds() else {
        return HttpResponse::NotFound().json(ErrorResponse {
            message: "Dataset is empty".to_string(),
        });
    };

    let range = query.resolve(bounds);
    log::info!("Dashboard requested for {}..={}", range.start, range.end);

    // Aggregation walks the whole window; keep it off the async workers
    let table = Arc::clone(&state.table);
    let leaderboard_size = state.leaderboard_size;
    let snapshot = web::block(move || {
        Dashboard::new(&table)
            .with_leaderboard_size(leaderboard_size)
            .snapshot(range)
    })
    .await;

    match snapshot {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => {
            log::error!("Dashboard computation failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                message: "Dashboard computation failed".to_string(),
            })
        }
    }
}

/// Register the API routes on an app; shared by `run_server` and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/api/bounds", web::get().to(bounds))
        .route("/api/dashboard", web::get().to(dashboard));
}

/// Start the HTTP server
pub async fn run_server(config: &ServerConfig, table: OrderTable) -> std::io::Result<()> {
    let state = web::Data::new(AppState::new(table, config.leaderboard_size));

    log::info!("MartDash server listening on http://{}:{}", config.host, config.port);
    log::info!("Dashboard: http://{}:{}/api/dashboard?start=YYYY-MM-DD&end=YYYY-MM-DD", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            // CORS for chart front-ends served from elsewhere
            .wrap(
                actix_cors::Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET"])
                    .allow_any_header()
                    .max_age(3600),
            )
            .configure(configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
