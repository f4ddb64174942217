pub mod delete; // DELETE /api/media/:id

pub use delete::media_delete;
