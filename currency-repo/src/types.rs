//! Database row types.

use sqlx::FromRow;

use currency_types::Currency;

/// Currency row from the `currencies` table.
#[derive(FromRow)]
pub struct DbCurrency {
    pub code: String,
    pub name: String,
    pub rate: f64,
}

impl DbCurrency {
    pub fn into_domain(self) -> Currency {
        Currency::new(self.code, self.name, self.rate)
    }
}
