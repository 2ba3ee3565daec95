mod editor_uploads;
mod media_resolution;
mod roster_paging;
