pub mod text_fold;
