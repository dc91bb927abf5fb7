use std::fmt::Write as _;

use shared::protocol::LedgerPage;

pub fn render_page(page: &LedgerPage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Account {}  balance {}", page.account_id, page.balance);

    if page.total_pages == 0 {
        let _ = writeln!(out, "No operations recorded.");
        return out;
    }

    let _ = writeln!(
        out,
        "Page {}/{} ({} per page)",
        page.current_page + 1,
        page.total_pages,
        page.page_size
    );
    let _ = writeln!(
        out,
        "{:<17} {:<7} {:>12}  {}",
        "DATE", "TYPE", "AMOUNT", "DESCRIPTION"
    );
    for operation in &page.operations {
        let _ = writeln!(
            out,
            "{:<17} {:<7} {:>12}  {}",
            operation.date.format("%Y-%m-%d %H:%M").to_string(),
            operation.operation_type.to_string(),
            operation.amount.to_string(),
            operation.description
        );
    }
    out
}
