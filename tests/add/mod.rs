mod add_respects_ignore_patterns;
mod add_stages_nested_files;
