//! `SeaORM` Entity for orders table.

use sea_orm::entity::prelude::*;

use super::sea_orm_active_enums::{ActionType, InstrumentType, OrderState};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub instrument: InstrumentType,
    pub action: ActionType,
    pub strategy: Option<String>,
    pub quantity: i64,
    pub limit_price: Option<Decimal>,
    pub status: OrderState,
    pub filled_price: Option<Decimal>,
    pub filled_at: Option<DateTimeWithTimeZone>,
    /// Trade produced by the fill.
    pub trade_id: Option<Uuid>,
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
    #[sea_orm(
        belongs_to = "super::trades::Entity",
        from = "Column::TradeId",
        to = "super::trades::Column::Id",
        on_delete = "SetNull"
    )]
    Trades,
    #[sea_orm(has_many = "super::order_events::Entity")]
    OrderEvents,
}

impl Related<super::order_events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderEvents.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
