//! 领料数量核算 (纯函数)
//!
//! - `remaining_to_issue = max(requested - issued, 0)`
//! - `remaining_to_receive = max(issued - received, 0)`
//! - 行状态与申请单状态由已发/已收数量推导，不单独存储决策

use shared::models::{
    ItemSummary, Request, RequestItem, RequestItemStatus, RequestStatus, RequestSummary,
};

use crate::utils::quantity::{add, gte, is_positive, sub_clamped};

pub fn remaining_to_issue(item: &RequestItem) -> f64 {
    sub_clamped(item.quantity_requested, item.quantity_issued)
}

pub fn remaining_to_receive(item: &RequestItem) -> f64 {
    sub_clamped(item.quantity_issued, item.quantity_received)
}

/// 行状态
///
/// received ≥ requested → RECEIVED; issued ≥ requested → ISSUED;
/// issued > 0 → PARTIALLY_ISSUED; 否则 PENDING
pub fn item_status(requested: f64, issued: f64, received: f64) -> RequestItemStatus {
    if gte(received, requested) {
        RequestItemStatus::Received
    } else if gte(issued, requested) {
        RequestItemStatus::Issued
    } else if is_positive(issued) {
        RequestItemStatus::PartiallyIssued
    } else {
        RequestItemStatus::Pending
    }
}

/// 发料/收料后的申请单状态
///
/// 全部行 RECEIVED → RECEIVED; 全部足额发出 → ISSUED;
/// 有任何发出 → PARTIALLY_ISSUED; 否则保持 APPROVED
pub fn derive_request_status(items: &[RequestItem]) -> RequestStatus {
    if items.is_empty() {
        return RequestStatus::Approved;
    }
    let all_received = items
        .iter()
        .all(|i| gte(i.quantity_received, i.quantity_requested));
    if all_received {
        return RequestStatus::Received;
    }
    let all_issued = items
        .iter()
        .all(|i| gte(i.quantity_issued, i.quantity_requested));
    if all_issued {
        return RequestStatus::Issued;
    }
    if items.iter().any(|i| is_positive(i.quantity_issued)) {
        RequestStatus::PartiallyIssued
    } else {
        RequestStatus::Approved
    }
}

/// `GET /api/requests/{id}/summary`
pub fn summarize(request: &Request) -> RequestSummary {
    let items: Vec<ItemSummary> = request
        .items
        .iter()
        .map(|item| ItemSummary {
            item_id: item.id,
            stock_in_id: item.stock_in_id,
            product_name: item.product_name.clone(),
            unit: item.unit.clone(),
            requested: item.quantity_requested,
            issued: item.quantity_issued,
            received: item.quantity_received,
            remaining_to_issue: remaining_to_issue(item),
            remaining_to_receive: remaining_to_receive(item),
            status: item.status,
        })
        .collect();

    RequestSummary {
        request_id: request.id,
        request_number: request.request_number.clone(),
        status: request.status,
        total_requested: items.iter().fold(0.0, |acc, i| add(acc, i.requested)),
        total_issued: items.iter().fold(0.0, |acc, i| add(acc, i.issued)),
        total_received: items.iter().fold(0.0, |acc, i| add(acc, i.received)),
        items,
    }
}

/// 申请单编号: REQ-000001
pub fn format_request_number(seq: i64) -> String {
    format!("REQ-{:06}", seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(requested: f64, issued: f64, received: f64) -> RequestItem {
        RequestItem {
            id: 1,
            request_id: 1,
            stock_in_id: 1,
            product_name: "Cement".into(),
            unit: "bag".into(),
            quantity_requested: requested,
            quantity_issued: issued,
            quantity_received: received,
            status: item_status(requested, issued, received),
        }
    }

    #[test]
    fn test_remaining_clamps_at_zero() {
        assert_eq!(remaining_to_issue(&item(10.0, 4.0, 0.0)), 6.0);
        assert_eq!(remaining_to_issue(&item(10.0, 12.0, 0.0)), 0.0);
        assert_eq!(remaining_to_receive(&item(10.0, 4.0, 1.5)), 2.5);
        assert_eq!(remaining_to_receive(&item(10.0, 4.0, 4.0)), 0.0);
    }

    #[test]
    fn test_fractional_quantities() {
        assert_eq!(remaining_to_issue(&item(0.3, 0.1, 0.0)), 0.2);
        assert_eq!(item_status(0.3, 0.1 + 0.2, 0.0), RequestItemStatus::Issued);
    }

    #[test]
    fn test_item_status() {
        assert_eq!(item_status(5.0, 0.0, 0.0), RequestItemStatus::Pending);
        assert_eq!(item_status(5.0, 2.0, 0.0), RequestItemStatus::PartiallyIssued);
        assert_eq!(item_status(5.0, 5.0, 0.0), RequestItemStatus::Issued);
        assert_eq!(item_status(5.0, 5.0, 3.0), RequestItemStatus::Issued);
        assert_eq!(item_status(5.0, 5.0, 5.0), RequestItemStatus::Received);
    }

    #[test]
    fn test_derive_request_status() {
        assert_eq!(
            derive_request_status(&[item(5.0, 0.0, 0.0), item(2.0, 0.0, 0.0)]),
            RequestStatus::Approved
        );
        assert_eq!(
            derive_request_status(&[item(5.0, 1.0, 0.0), item(2.0, 0.0, 0.0)]),
            RequestStatus::PartiallyIssued
        );
        assert_eq!(
            derive_request_status(&[item(5.0, 5.0, 0.0), item(2.0, 2.0, 2.0)]),
            RequestStatus::Issued
        );
        assert_eq!(
            derive_request_status(&[item(5.0, 5.0, 5.0), item(2.0, 2.0, 2.0)]),
            RequestStatus::Received
        );
    }

    #[test]
    fn test_summary_totals() {
        let request = Request {
            id: 9,
            request_number: format_request_number(9),
            site: "Hatchery".into(),
            purpose: None,
            requested_by: 1,
            status: RequestStatus::PartiallyIssued,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            created_at: 0,
            updated_at: 0,
            items: vec![item(5.0, 2.5, 1.0), item(0.2, 0.1, 0.0)],
        };
        let summary = summarize(&request);
        assert_eq!(summary.request_number, "REQ-000009");
        assert_eq!(summary.total_requested, 5.2);
        assert_eq!(summary.total_issued, 2.6);
        assert_eq!(summary.total_received, 1.0);
        assert_eq!(summary.items[0].remaining_to_issue, 2.5);
        assert_eq!(summary.items[0].remaining_to_receive, 1.5);
    }
}
