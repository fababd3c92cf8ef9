//! `linkprobe tips`

use linkprobe::ui::format_tips;

pub(crate) fn cmd_tips() {
    println!("{}", format_tips());
}
