//! Profile page, likes, and the profile editor.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, State, multipart::Field},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{info, instrument, warn};

use gymnet_core::edit::{EditError, ProfileEdit, check_new_work_images};
use gymnet_core::share::ShareLinks;
use gymnet_core::{Profile, ProfileId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CurrentUser, RequireUser};
use crate::repository::RepositoryError;
use crate::state::AppState;

// =============================================================================
// Profile page
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub viewer: Option<Profile>,
    pub profile: Profile,
    pub share: ShareLinks,
    /// Gym locations shared with the viewer.
    pub mutual_locations: Vec<String>,
    pub liked: bool,
    pub can_like: bool,
    pub is_owner: bool,
}

/// Like button (HTMX fragment).
#[derive(Template, WebTemplate)]
#[template(path = "partials/like_button.html")]
pub struct LikeButtonTemplate {
    pub profile_id: ProfileId,
    pub liked: bool,
}

/// Profile page.
///
/// # Route
///
/// `GET /profile/{id}`
#[instrument(skip(state, viewer))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(viewer): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = ProfileId::new(id);
    let profile = state
        .profiles()
        .get_by_id(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("profile {id}")))?;

    let is_owner = viewer.as_ref().is_some_and(|v| v.id == profile.id);
    let can_like = viewer.is_some() && !is_owner;
    let liked = match viewer.as_ref() {
        Some(v) if can_like => state.likes().is_liked(&v.id, &profile.id).await,
        _ => false,
    };
    let mutual_locations = viewer
        .as_ref()
        .filter(|_| !is_owner)
        .map(|v| {
            profile
                .mutual_locations(&v.gym_locations)
                .into_iter()
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();
    let share = ShareLinks::new(&state.config().base_url, &profile.id, &profile.name);

    Ok(ProfileTemplate {
        viewer,
        profile,
        share,
        mutual_locations,
        liked,
        can_like,
        is_owner,
    })
}

/// Toggle the viewer's like of a profile.
///
/// # Route
///
/// `POST /profile/{id}/like`
#[instrument(skip(state, viewer), fields(viewer = %viewer.id))]
pub async fn toggle_like(
    State(state): State<AppState>,
    RequireUser(viewer): RequireUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = ProfileId::new(id);
    if id == viewer.id {
        return Err(AppError::BadRequest("You cannot like your own profile".to_string()));
    }

    let liked = state.likes().toggle(&viewer.id, &id).await?;
    add_breadcrumb(
        "like",
        if liked { "Liked profile" } else { "Unliked profile" },
        Some(&[("profile_id", id.as_str())]),
    );

    Ok(LikeButtonTemplate {
        profile_id: id,
        liked,
    })
}

// =============================================================================
// Profile editor
// =============================================================================

#[derive(Template, WebTemplate)]
#[template(path = "edit_profile.html")]
pub struct EditProfileTemplate {
    pub viewer: Option<Profile>,
    pub profile: Profile,
    pub form: ProfileEdit,
    pub error: Option<String>,
    pub max_new_work_images: usize,
}

impl EditProfileTemplate {
    fn new(profile: Profile, form: ProfileEdit, error: Option<String>) -> Self {
        Self {
            viewer: Some(profile.clone()),
            profile,
            form,
            error,
            max_new_work_images: gymnet_core::edit::MAX_NEW_WORK_IMAGES,
        }
    }
}

/// Profile editor for the signed-in member.
///
/// # Route
///
/// `GET /profile/edit`
pub async fn edit_page(RequireUser(me): RequireUser) -> impl IntoResponse {
    let form = ProfileEdit::from_profile(&me);
    EditProfileTemplate::new(me, form, None)
}

/// An uploaded file from the editor form.
struct Upload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Everything submitted by the editor form.
#[derive(Default)]
struct EditSubmission {
    form: ProfileEdit,
    image: Option<Upload>,
    work_images: Vec<Upload>,
}

async fn read_upload(field: Field<'_>) -> Result<Option<Upload>> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    // Browsers send an empty part for an untouched file input
    if file_name.is_empty() || bytes.is_empty() {
        return Ok(None);
    }
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest(format!("{file_name} is not an image")));
    }

    Ok(Some(Upload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

async fn read_submission(mut multipart: Multipart) -> Result<EditSubmission> {
    let mut submission = EditSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => submission.image = read_upload(field).await?,
            "work_images" => {
                if let Some(upload) = read_upload(field).await? {
                    submission.work_images.push(upload);
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.body_text()))?;
                let form = &mut submission.form;
                match name.as_str() {
                    "name" => form.name = value,
                    "username" => form.username = value,
                    "business_description" => form.business_description = value,
                    "phone" => form.phone = value,
                    "website" => form.website = value,
                    "address" => form.address = value,
                    "instagram" => form.instagram = value,
                    "linkedin" => form.linkedin = value,
                    "twitter" => form.twitter = value,
                    "facebook" => form.facebook = value,
                    "gym_locations" => form.gym_locations = value,
                    "removed_work_images" => form.removed_work_images.push(value),
                    other => warn!(field = other, "Ignoring unknown form field"),
                }
            }
        }
    }

    Ok(submission)
}

/// Why a save was refused, shown above the form.
enum SaveError {
    Edit(EditError),
    Repository(RepositoryError),
}

impl SaveError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Edit(_) => StatusCode::BAD_REQUEST,
            Self::Repository(RepositoryError::MissingBucket) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Repository(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Edit(e) => e.to_string(),
            Self::Repository(RepositoryError::MissingBucket) => {
                "Image uploads are not configured, please try again later".to_string()
            }
            Self::Repository(RepositoryError::Upload(_)) => {
                "Uploading your images failed, please try again".to_string()
            }
            Self::Repository(_) => "Saving your profile failed, please try again".to_string(),
        }
    }
}

async fn save(
    state: &AppState,
    me: &Profile,
    submission: EditSubmission,
) -> std::result::Result<(), SaveError> {
    // Reject before any upload
    check_new_work_images(submission.work_images.len()).map_err(SaveError::Edit)?;
    if submission.form.name.trim().is_empty() {
        return Err(SaveError::Edit(EditError::EmptyName));
    }

    let profiles = state.profiles();
    let image_url = match submission.image {
        Some(upload) => Some(
            profiles
                .upload_image(&upload.file_name, &upload.content_type, upload.bytes)
                .await
                .map_err(SaveError::Repository)?,
        ),
        None => None,
    };

    let mut new_work_images = Vec::with_capacity(submission.work_images.len());
    for upload in submission.work_images {
        let url = profiles
            .upload_image(&upload.file_name, &upload.content_type, upload.bytes)
            .await
            .map_err(SaveError::Repository)?;
        new_work_images.push(url);
    }

    let update = submission
        .form
        .into_update(me, image_url, new_work_images)
        .map_err(SaveError::Edit)?;
    profiles
        .update(&me.id, &update)
        .await
        .map_err(SaveError::Repository)?;
    Ok(())
}

/// Save the editor form.
///
/// Validation and write failures re-render the form with a message; the
/// stored profile is only touched once every upload succeeded.
///
/// # Route
///
/// `POST /profile/edit`
#[instrument(skip_all, fields(profile_id = %me.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(me): RequireUser,
    multipart: Multipart,
) -> Result<Response> {
    let submission = read_submission(multipart).await?;
    let form = submission.form.clone();

    match save(&state, &me, submission).await {
        Ok(()) => {
            info!("Profile updated");
            add_breadcrumb("profile", "Updated profile", None);
            Ok(Redirect::to(&format!("/profile/{}", me.id)).into_response())
        }
        Err(e) => {
            if let SaveError::Repository(err) = &e {
                warn!(error = %err, "Profile save failed");
            }
            let status = e.status();
            Ok((status, EditProfileTemplate::new(me, form, Some(e.message()))).into_response())
        }
    }
}
