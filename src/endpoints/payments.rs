use crate::cache::tags::Tag;
use crate::endpoints::QueryDef;
use crate::models::payment::PaymentStatus;

#[derive(Debug, Clone, Default)]
pub struct PaymentListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<PaymentStatus>,
}

fn status_str(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Paid => "PAID",
        PaymentStatus::Unpaid => "UNPAID",
        PaymentStatus::Failed => "FAILED",
        PaymentStatus::Cancelled => "CANCELLED",
        PaymentStatus::Refunded => "REFUNDED",
    }
}

pub fn my_payments(params: &PaymentListParams) -> QueryDef {
    QueryDef::get("/payment/my-payments", [Tag::Payment])
        .param("page", params.page)
        .param("limit", params.limit)
        .param("status", params.status.map(status_str))
}

pub fn all_payments(params: &PaymentListParams) -> QueryDef {
    QueryDef::get("/payment/all-payments", [Tag::Payment])
        .param("page", params.page)
        .param("limit", params.limit)
        .param("status", params.status.map(status_str))
}

pub fn invoice(id: &str) -> QueryDef {
    QueryDef::get(format!("/payment/{id}/invoice"), [Tag::Payment])
}
