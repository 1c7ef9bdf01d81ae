// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! AI model registration and invocation.

use reqwest::Method;

use super::send_json;
use crate::error::ApiResponse;
use crate::models::{AiInvokeBody, AiInvokeParams, AiInvokeResponse, AiModelConfig, MessageResponse};
use crate::state::SdkContext;

#[derive(Clone, Debug)]
pub struct AiClient {
    ctx: SdkContext,
}

impl AiClient {
    pub fn new(ctx: SdkContext) -> Self {
        Self { ctx }
    }

    pub async fn invoke_ai(&self, params: &AiInvokeParams) -> ApiResponse<AiInvokeResponse> {
        let body = AiInvokeBody {
            user_id: &params.user_id,
            api_key: &self.ctx.config.api_key,
            model_id: &params.model_id,
            input_type: params.input_type,
            input_data: &params.input_data,
        };
        send_json(
            &self.ctx.executor,
            Method::POST,
            "/devApi/AI/invoke".to_string(),
            Some(&body),
            "prismon:invokeAI",
        )
        .await
    }

    pub async fn register_model(&self, config: &AiModelConfig) -> ApiResponse<MessageResponse> {
        send_json(
            &self.ctx.executor,
            Method::POST,
            "/devApi/ai/models".to_string(),
            Some(config),
            "prismon:registerModel",
        )
        .await
    }
}
