//! Table and line rendering for CLI output. Colors degrade to plain text
//! when stdout is not a terminal.

use colored::Colorize;

use crate::core::services::{
    PayByParentOutcome, PayForwardOutcome, ReceivableDashboard, ReceivablePage,
    ReceivableSummary, StudentReceivables,
};
use crate::domain::{PaymentStatus, Student};

pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

fn status_label(status: PaymentStatus) -> String {
    let label = status.to_string();
    match status {
        PaymentStatus::Paid => label.green().to_string(),
        PaymentStatus::Partial => label.yellow().to_string(),
        PaymentStatus::Unpaid => label.red().to_string(),
    }
}

pub fn print_students(students: &[Student]) {
    println!(
        "{}",
        format!("{:<38} {:<20} {:>10}", "ID", "NAME", "FEE").bold()
    );
    for student in students {
        let fee = student
            .monthly_fee
            .map(money)
            .unwrap_or_else(|| "-".to_string());
        println!("{:<38} {:<20} {:>10}", student.id, student.name, fee);
    }
}

pub fn print_summary(name: &str, summary: &ReceivableSummary) {
    println!("{}", format!("Receivable for {name} — {}", summary.month).bold());
    println!("  amount due:   {}", money(summary.amount_due));
    println!("  amount paid:  {}", money(summary.amount_paid));
    println!("  remaining:    {}", money(summary.remaining_balance));
    println!("  status:       {}", status_label(summary.status));
    println!("  due date:     {}", summary.due_date);
    if summary.is_overdue {
        println!(
            "  overdue:      {}",
            format!("{} days", summary.days_overdue).red()
        );
    } else {
        println!("  overdue:      no");
    }
}

pub fn print_receivable_page(page: &ReceivablePage) {
    println!(
        "{}",
        format!(
            "{:<10} {:<38} {:>12} {:>12} {:>10}",
            "MONTH", "STUDENT", "DUE", "REMAINING", "STATUS"
        )
        .bold()
    );
    for item in &page.items {
        println!(
            "{:<10} {:<38} {:>12} {:>12} {:>10}",
            item.month.to_string(),
            item.student_id,
            money(item.amount_due),
            money(item.remaining_balance),
            status_label(item.status)
        );
    }
    println!(
        "page {} of {} receivables (page size {})",
        page.page, page.total, page.per_page
    );
}

pub fn print_student_receivables(name: &str, view: &StudentReceivables) {
    println!("{}", format!("Receivables for {name}").bold());
    println!("  total outstanding: {}", money(view.total_outstanding));
    println!("  open periods:      {}", view.outstanding.len());
    for entry in &view.history {
        println!(
            "  {} due {} paid {} ({} receipts)",
            entry.period.month,
            money(entry.period.amount_due()),
            money(entry.period.amount_paid),
            entry.receipts.len()
        );
    }
}

pub fn print_dashboard(dashboard: &ReceivableDashboard) {
    println!("{}", "Receivable dashboard".bold());
    println!(
        "  outstanding total: {}",
        money(dashboard.total_outstanding_balance)
    );
    println!(
        "  overdue total:     {}",
        money(dashboard.total_overdue_amount)
    );
    println!(
        "  students owing:    {}",
        dashboard.students_with_balance
    );
    println!(
        "  aging 0-30/31-60/61+: {} / {} / {}",
        money(dashboard.aging.days_0_30),
        money(dashboard.aging.days_31_60),
        money(dashboard.aging.days_61_plus)
    );
    println!("  trend (12 months):");
    for entry in &dashboard.monthly_trend {
        println!("    {} {}", entry.month, money(entry.outstanding));
    }
}

pub fn print_pay_forward(outcome: &PayForwardOutcome) {
    println!(
        "pay-forward settled {} month(s), skipped {} (batch {})",
        outcome.created,
        outcome.skipped.len(),
        outcome.batch_id
    );
    for month in &outcome.months {
        println!("  settled {month}");
    }
}

pub fn print_pay_by_parent(outcome: &PayByParentOutcome) {
    println!(
        "pay-by-parent created {} receipt(s) totalling {}",
        outcome.created,
        money(outcome.total_amount)
    );
    for allocation in &outcome.allocations {
        println!(
            "  student {} paid {} discount {}",
            allocation.student_id,
            money(allocation.amount),
            money(allocation.discount)
        );
    }
}
