pub mod menu;
pub mod progress_bar;
pub mod question_card;
