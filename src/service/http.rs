//! REST course service over reqwest.

use reqwest::{header, Client, Response};
use serde::Serialize;

use crate::curriculum::Course;
use crate::error::{CurriculumError, CurriculumResult};
use crate::progress::Progress;
use crate::service::{CourseService, ServiceConfig};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModuleOrderBody<'a> {
    module_ids: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LessonOrderBody<'a> {
    lesson_ids: &'a [String],
}

/// API client for the course endpoints.
pub struct HttpCourseService {
    client: Client,
    base_url: String,
}

impl HttpCourseService {
    /// Create a new client from connection settings.
    pub fn new(config: &ServiceConfig) -> CurriculumResult<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = &config.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| CurriculumError::serialization(format!("invalid token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| CurriculumError::serialization(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }
}

/// Turns a non-success response into a PersistenceFailure for `target`.
async fn check(target: &str, resp: Response) -> CurriculumResult<Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    Err(CurriculumError::persistence(
        target,
        format!("HTTP {}: {}", status, message),
    ))
}

fn transport(target: &str, err: reqwest::Error) -> CurriculumError {
    CurriculumError::persistence(target, err.to_string())
}

impl CourseService for HttpCourseService {
    /// GET /api/v1/courses/{id}?include=lessons
    async fn load_course_with_lessons(&self, course_id: &str) -> CurriculumResult<Course> {
        let target = format!("course {}", course_id);
        let url = self.url(&format!("courses/{}?include=lessons", course_id));
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(&target, e))?;
        let resp = check(&target, resp).await?;
        resp.json().await.map_err(|e| transport(&target, e))
    }

    /// GET /api/v1/courses/{id}/progress
    async fn load_progress(&self, course_id: &str) -> CurriculumResult<Progress> {
        let target = format!("progress of course {}", course_id);
        let url = self.url(&format!("courses/{}/progress", course_id));
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(&target, e))?;
        let resp = check(&target, resp).await?;
        resp.json().await.map_err(|e| transport(&target, e))
    }

    /// PUT /api/v1/courses/{id}/modules/order
    async fn persist_module_order(&self, course_id: &str, module_ids: &[String]) -> CurriculumResult<()> {
        let target = "module order";
        let url = self.url(&format!("courses/{}/modules/order", course_id));
        let resp = self
            .client
            .put(&url)
            .json(&ModuleOrderBody { module_ids })
            .send()
            .await
            .map_err(|e| transport(target, e))?;
        check(target, resp).await?;
        Ok(())
    }

    /// PUT /api/v1/courses/{id}/modules/{moduleId}/lessons/order
    async fn persist_lesson_order(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_ids: &[String],
    ) -> CurriculumResult<()> {
        let target = format!("lesson order of module {}", module_id);
        let url = self.url(&format!(
            "courses/{}/modules/{}/lessons/order",
            course_id, module_id
        ));
        let resp = self
            .client
            .put(&url)
            .json(&LessonOrderBody { lesson_ids })
            .send()
            .await
            .map_err(|e| transport(&target, e))?;
        check(&target, resp).await?;
        Ok(())
    }
}
