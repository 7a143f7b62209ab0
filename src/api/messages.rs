use crate::api::AppState;
use crate::api::extract::RequestValues;
use crate::api::render::{Format, Notice, Reply};
use crate::api::schemas::messages::{FormContext, GridResponse, IndexContext, InfoResponse};
use crate::domain::grid::{GridRequest, project_fields};
use crate::domain::message::MessageForm;
use crate::error::{AppError, Result};
use axum::{extract::State, http::Method, response::Response};

const NOT_FOUND: &str = "The message not found or deleted!";
const CHECK_INPUT: &str = "Please check your data entered!";

fn not_found(format: Format) -> Result<Reply> {
    Ok(Reply::page("base.html", ())?.notice(Notice::warning(NOT_FOUND)).redirect("/").format(format))
}

/// Listing page, or one page of grid data when the request carries `draw`.
///
/// # Errors
/// Returns `AppError::Database` if the grid query fails.
pub async fn index(State(state): State<AppState>, values: RequestValues) -> Result<Response> {
    let params = values.decode();

    if let Some(request) = GridRequest::from_params(&params, state.config.grid.default_page_length) {
        let page = state.message_service.grid_page(&request).await?;
        return Reply::json(GridResponse::new(request.draw, page))?.render(&state.templates);
    }

    Reply::page("messages.html", IndexContext::new(state.config.grid.default_page_length))?
        .format(values.format())
        .render(&state.templates)
}

/// Add form (GET) and submission (POST).
///
/// # Errors
/// Returns `AppError::Database` if the message cannot be stored.
pub async fn add(State(state): State<AppState>, method: Method, values: RequestValues) -> Result<Response> {
    let format = values.format();

    if method != Method::POST {
        return Reply::page("add_edit.html", FormContext::add(MessageForm::default()).titled("Messages :: Add"))?
            .format(format)
            .render(&state.templates);
    }

    let form = values.message_form();
    let reply = match state.message_service.create(&form).await {
        Ok(_) => Reply::page("base.html", ())?.notice(Notice::success("The message successfully added!")).redirect("/"),
        Err(AppError::Validation(errors)) => Reply::page("add_edit.html", FormContext::add(form).with_errors(&errors))?
            .notice(Notice::warning(CHECK_INPUT)),
        Err(e) => return Err(e),
    };

    reply.format(format).render(&state.templates)
}

/// Edit form (GET) and submission (POST) for a live message.
///
/// # Errors
/// Returns `AppError::Database` if the lookup or the update fails.
pub async fn edit(State(state): State<AppState>, method: Method, values: RequestValues) -> Result<Response> {
    let format = values.format();

    let Some(id) = values.id() else {
        return not_found(format)?.render(&state.templates);
    };
    let message = match state.message_service.find_live(id).await {
        Ok(message) => message,
        Err(AppError::NotFound) => return not_found(format)?.render(&state.templates),
        Err(e) => return Err(e),
    };

    if method != Method::POST {
        let context = FormContext::edit(id, MessageForm::from_message(&message)).titled("Messages :: Edit");
        return Reply::page("add_edit.html", context)?.format(format).render(&state.templates);
    }

    let form = values.message_form();
    let reply = match state.message_service.update(id, &form).await {
        Ok(updated) => Reply::page("add_edit.html", FormContext::edit(id, MessageForm::from_message(&updated)))?
            .notice(Notice::success("The message successfully updated!"))
            .redirect("/"),
        Err(AppError::Validation(errors)) => {
            Reply::page("add_edit.html", FormContext::edit(id, form).with_errors(&errors))?
                .notice(Notice::warning(CHECK_INPUT))
        }
        Err(AppError::NotFound) => not_found(format)?,
        Err(e) => return Err(e),
    };

    reply.format(format).render(&state.templates)
}

/// Soft-deletes a live message.
///
/// # Errors
/// Returns `AppError::Database` if the update fails.
pub async fn delete(State(state): State<AppState>, values: RequestValues) -> Result<Response> {
    let format = values.format();

    let Some(id) = values.id() else {
        return not_found(format)?.render(&state.templates);
    };

    let reply = match state.message_service.soft_delete(id).await {
        Ok(()) => Reply::page("base.html", ())?.notice(Notice::dark("The message successfully deleted!")).redirect("/"),
        Err(AppError::NotFound) => not_found(format)?,
        Err(e) => return Err(e),
    };

    reply.format(format).render(&state.templates)
}

/// Display-safe fields of one live message, as JSON.
///
/// # Errors
/// Returns `AppError::Database` if the lookup fails.
pub async fn info(State(state): State<AppState>, values: RequestValues) -> Result<Response> {
    let found = match values.id() {
        Some(id) => match state.message_service.find_live(id).await {
            Ok(message) => Some(message),
            Err(AppError::NotFound) => None,
            Err(e) => return Err(e),
        },
        None => None,
    };

    let reply = match found {
        Some(message) => Reply::json(InfoResponse { data: project_fields(&message) })?,
        None => Reply::json(())?.notice(Notice::warning(NOT_FOUND)),
    };

    reply.render(&state.templates)
}
