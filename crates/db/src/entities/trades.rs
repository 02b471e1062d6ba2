//! `SeaORM` Entity for trades table.

use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{ActionType, InstrumentType, OptionRight};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trades")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub instrument: InstrumentType,
    pub strategy: Option<String>,
    pub action: ActionType,
    pub quantity: i64,
    pub entry_price: Decimal,
    pub entry_date: DateTimeWithTimeZone,
    pub is_closed: bool,
    pub exit_price: Option<Decimal>,
    pub exit_date: Option<DateTimeWithTimeZone>,
    pub realized_pnl: Option<Decimal>,
    pub option_type: Option<OptionRight>,
    pub strike_price: Option<Decimal>,
    pub expiry_date: Option<Date>,
    pub client_order_id: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Users,
}

impl ActiveModelBehavior for ActiveModel {}
