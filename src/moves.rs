pub mod leaper_attacks;
pub mod move_descriptions;
pub mod slider_attacks;
