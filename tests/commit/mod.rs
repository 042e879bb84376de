mod commit_requires_identity_and_content;
mod first_commit_has_stable_id;
