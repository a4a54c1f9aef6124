mod progress;
mod reports;
mod summary;
mod tables;

pub use progress::{create_progress_bar, print_exclusion_list};
pub use reports::{print_report, print_report_quiet};
pub use summary::{print_conversion_stats, print_header, print_summary_pills};
pub use tables::{print_conversion_errors, print_outcomes, print_review_queue, print_violations};
