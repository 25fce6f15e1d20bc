use std::path::Path;
use std::sync::Arc;

use fitshare_core::plan::{MealPlan, MealPlanInput};
use fitshare_core::story::{WorkoutStory, WorkoutStoryInput};
use fitshare_core::{StaticToken, TokenSource};
use fitshare_media::{HttpUploader, MediaError, MediaFile, MediaUploader};
use tokio::runtime::Runtime;

use crate::{FeedService, HttpService, ServiceError};

/// Blocking wrapper around the async `HttpService`.
///
/// Creates an internal tokio runtime and uses `block_on()` for each call.
/// Designed for sync callers like the terminal client. Also owns the media
/// uploader so the client has one handle for every outbound call.
pub struct BlockingHttpService {
    inner: HttpService,
    uploader: Arc<dyn MediaUploader>,
    rt: Runtime,
}

impl BlockingHttpService {
    pub fn new(base_url: &str) -> Self {
        Self::with_token_source(base_url, Arc::new(StaticToken::none()))
    }

    pub fn with_token(base_url: &str, token: String) -> Self {
        Self::with_token_source(base_url, Arc::new(StaticToken::new(token)))
    }

    /// Uploads default to the same backend's `/media/upload` endpoint.
    pub fn with_token_source(base_url: &str, token: Arc<dyn TokenSource>) -> Self {
        let uploader = Arc::new(HttpUploader::new(base_url, token.clone()));
        Self {
            inner: HttpService::with_token_source(base_url, token),
            uploader,
            rt: Runtime::new().expect("failed to create tokio runtime"),
        }
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn MediaUploader>) -> Self {
        self.uploader = uploader;
        self
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    pub fn health_check(&self) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.health_check())
    }

    // -- Media --

    /// Read a file from disk and upload it into `folder`, returning its URL.
    pub fn upload_path(&self, path: &Path, folder: &str) -> Result<String, MediaError> {
        self.rt.block_on(async {
            let file = MediaFile::from_path(path).await?;
            self.uploader.upload(file, folder).await
        })
    }

    pub fn upload(&self, file: MediaFile, folder: &str) -> Result<String, MediaError> {
        self.rt.block_on(self.uploader.upload(file, folder))
    }

    // -- Trait method delegates --

    pub fn list_meal_plans(&self) -> Result<Vec<MealPlan>, ServiceError> {
        self.rt.block_on(self.inner.list_meal_plans())
    }

    pub fn get_meal_plan(&self, id: &str) -> Result<MealPlan, ServiceError> {
        self.rt.block_on(self.inner.get_meal_plan(id))
    }

    pub fn create_meal_plan(&self, input: &MealPlanInput) -> Result<MealPlan, ServiceError> {
        self.rt.block_on(self.inner.create_meal_plan(input))
    }

    pub fn update_meal_plan(
        &self,
        id: &str,
        input: &MealPlanInput,
    ) -> Result<MealPlan, ServiceError> {
        self.rt.block_on(self.inner.update_meal_plan(id, input))
    }

    pub fn delete_meal_plan(&self, id: &str) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.delete_meal_plan(id))
    }

    pub fn list_workout_stories(&self) -> Result<Vec<WorkoutStory>, ServiceError> {
        self.rt.block_on(self.inner.list_workout_stories())
    }

    pub fn get_workout_story(&self, id: &str) -> Result<WorkoutStory, ServiceError> {
        self.rt.block_on(self.inner.get_workout_story(id))
    }

    pub fn create_workout_story(
        &self,
        input: &WorkoutStoryInput,
    ) -> Result<WorkoutStory, ServiceError> {
        self.rt.block_on(self.inner.create_workout_story(input))
    }

    pub fn update_workout_story(
        &self,
        id: &str,
        input: &WorkoutStoryInput,
    ) -> Result<WorkoutStory, ServiceError> {
        self.rt.block_on(self.inner.update_workout_story(id, input))
    }

    pub fn delete_workout_story(&self, id: &str) -> Result<(), ServiceError> {
        self.rt.block_on(self.inner.delete_workout_story(id))
    }
}

#[cfg(test)]
mod tests {
    use fitshare_core::story::{Category, Intensity};
    use fitshare_devserver::test_helpers::{Op, SharedState};

    use super::*;

    /// Spawn a test server on a background thread (since BlockingHttpService
    /// creates its own tokio runtime and cannot be nested inside another).
    /// The server stays alive via `std::future::pending()`.
    fn spawn_blocking_server() -> (String, SharedState) {
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let server = fitshare_devserver::test_helpers::spawn_test_server().await;
                tx.send((server.api_url.clone(), server.state.clone()))
                    .unwrap();
                std::future::pending::<()>().await;
            });
        });
        rx.recv().unwrap()
    }

    fn story_input(title: &str) -> WorkoutStoryInput {
        WorkoutStoryInput {
            user_id: "u1".into(),
            title: title.into(),
            description: "Intervals".into(),
            timestamp: None,
            exercise_type: "Cardio".into(),
            time_duration: 40,
            intensity: Some(Intensity::Moderate),
            category: Category::Intermediate,
            image: None,
        }
    }

    #[test]
    fn blocking_health_check() {
        let (url, _) = spawn_blocking_server();
        let svc = BlockingHttpService::new(&url);
        svc.health_check().unwrap();
    }

    #[test]
    fn blocking_story_crud() {
        let (url, state) = spawn_blocking_server();
        let svc = BlockingHttpService::new(&url);

        let story = svc.create_workout_story(&story_input("Track")).unwrap();
        assert_eq!(story.title, "Track");
        assert_eq!(story.intensity, Some(Intensity::Moderate));

        let fetched = svc.get_workout_story(&story.id).unwrap();
        assert_eq!(fetched, story);

        let updated = svc
            .update_workout_story(&story.id, &story_input("Track 2"))
            .unwrap();
        assert_eq!(updated.title, "Track 2");

        svc.delete_workout_story(&story.id).unwrap();
        assert!(svc.list_workout_stories().unwrap().is_empty());
        assert_eq!(state.hits(Op::DeleteStory), 1);
    }

    #[test]
    fn blocking_upload_path_goes_to_backend() {
        let (url, state) = spawn_blocking_server();
        let svc = BlockingHttpService::new(&url);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("squat.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let media_url = svc
            .upload_path(&path, fitshare_media::STORY_FOLDER)
            .unwrap();
        assert!(media_url.contains("workoutStories"));
        assert!(media_url.ends_with("squat.png"));
        assert_eq!(state.hits(Op::Upload), 1);
    }

    #[test]
    fn blocking_get_missing_is_not_found() {
        let (url, _) = spawn_blocking_server();
        let svc = BlockingHttpService::new(&url);
        let err = svc.get_meal_plan("nope").unwrap_err();
        assert!(err.is_not_found());
    }
}
