pub mod blur;
pub mod crystallize;
pub mod edges;
pub mod pixellate;
pub mod sepia;
pub mod unsharp;
pub mod vignette;
