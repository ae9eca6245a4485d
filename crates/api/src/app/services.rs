//! Persistence wiring shared by every handler.

use sqlx::SqlitePool;

use crewpay_store::{ClientInvoiceService, ConsultantRepo, CycleRepo};

/// One instance per process, shared via `Extension<Arc<AppServices>>`.
pub struct AppServices {
    pub consultants: ConsultantRepo,
    pub cycles: CycleRepo,
    pub invoices: ClientInvoiceService,
}

impl AppServices {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            consultants: ConsultantRepo::new(pool.clone()),
            cycles: CycleRepo::new(pool.clone()),
            invoices: ClientInvoiceService::new(pool),
        }
    }
}
